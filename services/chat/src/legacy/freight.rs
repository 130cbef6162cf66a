use std::fmt::Write as _;

use cargolink_core::serde::clock_time;
use cargolink_domain::id::{BookingId, LoadId};

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::{Shipper, rupees};
use crate::error::ChatServiceError;
use crate::legacy::reply::{self, MAX_LISTED};
use crate::legacy::{CommandDispatcher, Reply, parse_amount, parse_id};
use crate::usecase::identity::Identity;
use crate::usecase::load::PostLoadInput;

const POST_INSTRUCTIONS: &str = "📦 *Post New Load*\n\n\
Send load details in this format:\n\
POST <From> <To> <Material> <Weight> <Price>\n\n\
Example: POST Chennai Bangalore Electronics 15 35000";

const POST_INCOMPLETE: &str = "❌ Incomplete details!\n\n\
Format: POST <From> <To> <Material> <Weight> <Price>\n\n\
Example: POST Chennai Bangalore Electronics 15 35000";

const TRACK_USAGE: &str =
    "❌ Invalid ID! Use a Booking ID (BK00001) or Load ID (LD00001).\n\nExample: TRACK BK00001";

/// `<from> <to> <material…> <weight> <price>`; the material may span several words.
fn parse_post(args: &str) -> Result<Option<PostLoadInput>, ChatServiceError> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let [from, to, material @ .., weight, price] = tokens.as_slice() else {
        return Ok(None);
    };
    if material.is_empty() {
        return Ok(None);
    }
    let invalid = || {
        ChatServiceError::Validation(
            "Weight and price must be numbers.\n\nExample: POST Chennai Bangalore Electronics 15 35000"
                .to_owned(),
        )
    };
    Ok(Some(PostLoadInput {
        from_city: (*from).to_owned(),
        to_city: (*to).to_owned(),
        material: material.join(" "),
        weight: parse_amount(weight).ok_or_else(invalid)?,
        price: parse_amount(price).ok_or_else(invalid)?,
    }))
}

impl<S: Storage, N: Notifier> CommandDispatcher<S, N> {
    pub(super) fn post_instructions(&self) -> Result<Reply, ChatServiceError> {
        Ok(Some(POST_INSTRUCTIONS.to_owned()))
    }

    // ── POST ─────────────────────────────────────────────────────────────────

    pub(super) async fn post(
        &self,
        shipper: &Shipper,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        if args.trim().is_empty() {
            return self.post_instructions();
        }
        let Some(input) = parse_post(args)? else {
            return Ok(Some(POST_INCOMPLETE.to_owned()));
        };
        let load = self.state.post_load().execute(shipper, input).await?;

        let fallback = format!(
            "✅ *Load Posted Successfully!*\n\n*Load ID:* {}\n*Route:* {}\n*Material:* {}\n*Weight:* {} tons\n*Price:* {}\n*Loading:* {}\n\n🔔 Notifying nearby truckers...",
            load.id,
            load.route(),
            load.material,
            load.weight,
            rupees(load.price),
            load.loading_date.format("%d %b %Y")
        );
        Ok(self
            .reply_template(
                &shipper.phone,
                "load_posted_confirm",
                &[
                    ("load_id", load.id.to_string()),
                    ("route", load.route()),
                    ("price", rupees(load.price)),
                ],
                fallback,
            )
            .await)
    }

    // ── MY LOADS ─────────────────────────────────────────────────────────────

    pub(super) async fn my_loads(&self, shipper: &Shipper) -> Result<Reply, ChatServiceError> {
        let loads = self.state.load_queries().by_shipper(shipper.id).await?;
        if loads.is_empty() {
            return Ok(Some(
                "📋 *Your Loads*\n\nNo loads posted yet.\n\nType POST to create a new load."
                    .to_owned(),
            ));
        }
        let mut out = String::from("📋 *Your Loads*\n\n");
        for load in loads.iter().take(MAX_LISTED) {
            let _ = write!(
                out,
                "{} *{}*\n🛣️ {}\n📦 {} • {} tons\n💰 {}\n\n",
                reply::load_status_emoji(load.status),
                load.id,
                load.route(),
                load.material,
                load.weight,
                rupees(load.price)
            );
        }
        if loads.len() > MAX_LISTED {
            let _ = write!(out, "... and {} more loads\n\n", loads.len() - MAX_LISTED);
        }
        out.push_str("Type TRACK <LoadID> to see booking details.");
        Ok(Some(out))
    }

    // ── TRACK ────────────────────────────────────────────────────────────────

    /// Booking or load tracking, for either party to it.
    pub(super) async fn track(
        &self,
        identity: &Identity,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        let raw = args.split_whitespace().next().unwrap_or_default().to_uppercase();
        if raw.starts_with("BK") {
            let id: BookingId = parse_id(&raw, TRACK_USAGE)?;
            self.track_booking(identity, id).await
        } else if raw.starts_with("LD") {
            let id: LoadId = parse_id(&raw, TRACK_USAGE)?;
            self.track_load(identity, id).await
        } else {
            Ok(Some(TRACK_USAGE.to_owned()))
        }
    }

    async fn track_booking(
        &self,
        identity: &Identity,
        id: BookingId,
    ) -> Result<Reply, ChatServiceError> {
        let booking = self.state.store.get_booking(id).await?;
        let party = match identity {
            Identity::Trucker(t) => booking.trucker_id == t.id,
            Identity::Shipper(s) => booking.shipper_id == s.id,
            Identity::Unknown => false,
        };
        if !party {
            return Err(ChatServiceError::NotBookingOwner);
        }
        let load = self.state.store.get_load(booking.load_id).await?;
        let trucker = self.state.store.get_trucker(booking.trucker_id).await?;

        let mut out = format!(
            "📍 *Booking Tracking*\n\n*Booking ID:* {}\n*Route:* {}\n*Material:* {}\n*Status:* {}\n*Trucker:* {} ({})\n",
            booking.id,
            load.route(),
            load.material,
            reply::booking_status_label(booking.status),
            trucker.name,
            trucker.vehicle_no
        );
        if let Some(at) = booking.picked_up_at {
            let _ = writeln!(out, "✅ Picked up: {}", clock_time(&at));
        }
        if let Some(at) = booking.delivered_at {
            let _ = writeln!(out, "✅ Delivered: {}", clock_time(&at));
        }
        out.push_str("\n_Last Update: Just now_");
        Ok(Some(out))
    }

    async fn track_load(&self, identity: &Identity, id: LoadId) -> Result<Reply, ChatServiceError> {
        let load = self.state.store.get_load(id).await?;
        if let Identity::Shipper(s) = identity {
            if load.shipper_id != s.id {
                return Err(ChatServiceError::LoadNotFound);
            }
        }
        let mut out = format!(
            "📦 *Load Tracking*\n\n*Load ID:* {}\n*Route:* {}\n*Material:* {}\n*Weight:* {} tons\n*Price:* {}\n*Status:* {} {}\n",
            load.id,
            load.route(),
            load.material,
            load.weight,
            rupees(load.price),
            reply::load_status_emoji(load.status),
            load.status.as_str()
        );
        let bookings = self.state.store.list_bookings_by_load(id).await?;
        if let Some(latest) = bookings.first() {
            let _ = write!(
                out,
                "*Booking:* {} ({})\n",
                latest.id,
                reply::booking_status_label(latest.status)
            );
        }
        Ok(Some(out.trim_end().to_owned()))
    }
}
