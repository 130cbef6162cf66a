use cargolink_core::serde::clock_time;
use cargolink_domain::id::{BookingId, LoadId};

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::{CANCELLATION_PENALTY, LoadSearch, Trucker, rupees};
use crate::error::ChatServiceError;
use crate::legacy::{CommandDispatcher, Reply, parse_amount, parse_id, reply};
use crate::usecase::booking::{Actor, format_journey};
use crate::usecase::identity::Identity;
use crate::usecase::load::title_case;

pub const LOAD_HINT: &str = "🔍 *Search Loads*\n\n\
Type: LOAD <from> <to>\n\n\
Example: LOAD Chennai Bangalore\n\
Or just: LOAD Chennai";

const BOOK_USAGE: &str = "Please give a Load ID.\n\nExample: BOOK LD00001";
const ARRIVED_USAGE: &str = "Please give a Booking ID.\n\nExample: ARRIVED BK00001";
const PICKUP_USAGE: &str = "❌ Invalid format!\n\n\
Format: PICKUP <BookingID> <OTP>\n\n\
Example: PICKUP BK00001 123456";
const DELIVER_USAGE: &str = "Please give a Booking ID.\n\nExample: DELIVER BK00001";
const CANCEL_USAGE: &str = "Please give a Booking ID.\n\nExample: CANCEL BK00001";
const DELAY_USAGE: &str = "⏰ *Report Delay*\n\n\
Format: DELAY <BookingID> <reason>\n\n\
Example: DELAY BK00001 Heavy traffic";
const NEGOTIATE_USAGE: &str = "💰 *Negotiate Price*\n\n\
Format: NEGOTIATE <LoadID> <your price>\n\n\
Example: NEGOTIATE LD00001 40000";

/// `<booking id> [<code>]`.
fn id_and_code(args: &str) -> (Option<&str>, Option<&str>) {
    let mut tokens = args.split_whitespace();
    (tokens.next(), tokens.next())
}

impl<S: Storage, N: Notifier> CommandDispatcher<S, N> {
    // ── LOAD ─────────────────────────────────────────────────────────────────

    pub(super) async fn search(
        &self,
        trucker: &Trucker,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        let mut cities = args.split_whitespace();
        let Some(from) = cities.next().map(title_case) else {
            return Ok(Some(LOAD_HINT.to_owned()));
        };
        let to = cities.next().map(title_case);

        let search = LoadSearch {
            from_city: Some(from.clone()),
            to_city: to.clone(),
            ..Default::default()
        };
        let loads = self.state.load_queries().search(&search).await?;
        let route = match &to {
            Some(to) => format!("{from} → {to}"),
            None => from,
        };
        if loads.is_empty() {
            return Ok(Some(format!(
                "😔 No loads available for {route} right now.\n\nWe'll notify you when a matching load is posted."
            )));
        }
        Ok(Some(reply::load_listing(
            &format!("Available Loads: {route}"),
            trucker,
            &loads,
        )))
    }

    // ── BOOK ─────────────────────────────────────────────────────────────────

    pub(super) async fn book(
        &self,
        trucker: &Trucker,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        let load_id: LoadId = parse_id(args, BOOK_USAGE)?;
        let view = self.state.booking_actions().book(trucker, load_id).await?;
        let (booking, load) = (&view.booking, &view.load);

        let fallback = format!(
            "✅ *Booking Confirmed!*\n\n*Booking ID:* {}\n*Load ID:* {}\n*Route:* {}\n*Material:* {}\n*Price:* {}\n*Commission (5%):* {}\n*You get:* {}\n*Loading:* {}\n\n*Next Steps:*\n1. Reach the pickup point on time\n2. Type ARRIVED {} when you get there\n3. Collect the pickup OTP from the shipper",
            booking.id,
            load.id,
            load.route(),
            load.material,
            rupees(booking.agreed_price),
            rupees(booking.commission),
            rupees(booking.net_amount),
            load.loading_date.format("%d %b %Y"),
            booking.id
        );
        Ok(self
            .reply_template(
                &trucker.phone,
                "trucker_booked_notification",
                &[
                    ("trucker_name", trucker.name.clone()),
                    ("load_id", load.id.to_string()),
                    ("route", load.route()),
                    ("amount", rupees(booking.net_amount)),
                ],
                fallback,
            )
            .await)
    }

    // ── STATUS ───────────────────────────────────────────────────────────────

    pub(super) async fn status(&self, trucker: &Trucker) -> Result<Reply, ChatServiceError> {
        let views = self.state.booking_actions().list_for_trucker(trucker).await?;
        Ok(Some(reply::active_bookings(&views)))
    }

    // ── Pickup checkpoint ────────────────────────────────────────────────────

    pub(super) async fn arrived(
        &self,
        trucker: &Trucker,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        let id: BookingId = parse_id(args, ARRIVED_USAGE)?;
        let checkpoint = match self.state.booking_actions().arrived(trucker, id).await {
            Err(ChatServiceError::AlreadyPickedUp) => {
                return Ok(Some(format!(
                    "✅ Load already picked up for {id}.\n\nWhen you reach the destination, type DELIVER {id}"
                )));
            }
            other => other?,
        };

        let fallback = format!(
            "📍 *Arrival Confirmed!*\n\n*Booking:* {}\n*Route:* {}\n\n🔐 The pickup OTP has been sent to the shipper.\nOnce loading is complete, collect the OTP and type:\nPICKUP {} <OTP>",
            checkpoint.booking.id,
            checkpoint.load.route(),
            checkpoint.booking.id
        );
        Ok(self
            .reply_template(
                &trucker.phone,
                "trucker_arrived_notify",
                &[
                    ("trucker_name", trucker.name.clone()),
                    ("vehicle_number", trucker.vehicle_no.clone()),
                    ("booking_id", id.to_string()),
                ],
                fallback,
            )
            .await)
    }

    pub(super) async fn pickup(
        &self,
        trucker: &Trucker,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        let (Some(raw_id), Some(code)) = id_and_code(args) else {
            return Ok(Some(PICKUP_USAGE.to_owned()));
        };
        let id: BookingId = parse_id(raw_id, PICKUP_USAGE)?;

        match self
            .state
            .booking_actions()
            .confirm_pickup(trucker, id, code)
            .await
        {
            Ok(view) => Ok(Some(format!(
                "✅ *Pickup Confirmed!*\n\n*Booking:* {}\n*Route:* {}\n*Picked up:* {}\n\n🚛 Have a safe journey!\n\n_Next: When you reach destination, type DELIVER {}_",
                view.booking.id,
                view.load.route(),
                view.booking
                    .picked_up_at
                    .as_ref()
                    .map(clock_time)
                    .unwrap_or_default(),
                view.booking.id
            ))),
            Err(e @ (ChatServiceError::OtpExpired | ChatServiceError::OtpTooManyAttempts)) => {
                Ok(Some(format!(
                    "{}\n\nType ARRIVED {id} to generate new OTP.",
                    e.user_message()
                )))
            }
            Err(e) => Err(e),
        }
    }

    // ── Delivery checkpoint ──────────────────────────────────────────────────

    /// Without a code the trucker announces arrival at the destination; with
    /// one the delivery is confirmed.
    pub(super) async fn deliver(
        &self,
        trucker: &Trucker,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        let (raw_id, code) = id_and_code(args);
        let id: BookingId = parse_id(raw_id.unwrap_or_default(), DELIVER_USAGE)?;
        let actions = self.state.booking_actions();

        let Some(code) = code else {
            return match actions.reach_destination(trucker, id).await {
                Ok(checkpoint) => Ok(Some(format!(
                    "🏁 *Reached Destination!*\n\n*Booking:* {}\n*Route:* {}\n\n🔐 The delivery OTP has been sent to the shipper for the consignee.\nAfter unloading, collect the OTP and type:\nDELIVER {} <OTP>",
                    checkpoint.booking.id,
                    checkpoint.load.route(),
                    checkpoint.booking.id
                ))),
                Err(ChatServiceError::NotPickedUp) => Ok(Some(format!(
                    "❌ Please complete pickup first! Type: ARRIVED {id}"
                ))),
                Err(e) => Err(e),
            };
        };

        let delivered = match actions.confirm_delivery(trucker, id, code).await {
            Ok(delivered) => delivered,
            Err(e @ (ChatServiceError::OtpExpired | ChatServiceError::OtpTooManyAttempts)) => {
                return Ok(Some(format!(
                    "{}\n\nType DELIVER {id} to generate new OTP.",
                    e.user_message()
                )));
            }
            Err(e) => return Err(e),
        };
        let delivered_at = delivered
            .booking
            .delivered_at
            .as_ref()
            .map(clock_time)
            .unwrap_or_default();
        let journey = delivered
            .journey
            .map(format_journey)
            .unwrap_or_else(|| "-".to_owned());

        let fallback = format!(
            "🎉 *Delivery Confirmed!*\n\n*Booking:* {}\n*Route:* {}\n*Delivered:* {}\n*Journey time:* {}\n\n💰 *Payment:* {}\nWill be credited within 48 hours.\n\nThank you for using CargoLink! 🙏",
            delivered.booking.id,
            delivered.load.route(),
            delivered_at,
            journey,
            rupees(delivered.booking.net_amount)
        );
        Ok(self
            .reply_template(
                &trucker.phone,
                "delivery_confirmation",
                &[
                    ("booking_id", id.to_string()),
                    ("delivered_at", delivered_at),
                    ("amount", rupees(delivered.booking.net_amount)),
                ],
                fallback,
            )
            .await)
    }

    // ── CANCEL ───────────────────────────────────────────────────────────────

    pub(super) async fn cancel(
        &self,
        identity: &Identity,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        let actor = match identity {
            Identity::Trucker(t) => Actor::Trucker(t.clone()),
            Identity::Shipper(s) => Actor::Shipper(s.clone()),
            Identity::Unknown => return Err(ChatServiceError::TruckerNotFound),
        };
        let id: BookingId = parse_id(args, CANCEL_USAGE)?;

        let view = match self.state.booking_actions().cancel(&actor, id).await {
            Ok(view) => view,
            Err(ChatServiceError::AlreadyPickedUp) => {
                return Ok(Some(
                    "❌ Cannot cancel! Load already picked up.\n\nContact support for assistance."
                        .to_owned(),
                ));
            }
            Err(e) => return Err(e),
        };

        let mut out = format!(
            "❌ *Booking Cancelled*\n\n*Booking:* {}\n*Route:* {}\n\nThe load is available again and the other party has been informed.",
            view.booking.id,
            view.load.route()
        );
        if let Actor::Trucker(_) = actor {
            out.push_str(&format!(
                "\n\n⚠️ A cancellation penalty of ₹{CANCELLATION_PENALTY} may apply."
            ));
        }
        Ok(Some(out))
    }

    // ── Incidents ────────────────────────────────────────────────────────────

    pub(super) async fn delay(
        &self,
        trucker: &Trucker,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        let (raw_id, reason) = match args.trim().split_once(char::is_whitespace) {
            Some((id, reason)) => (id, reason.trim()),
            None => (args.trim(), ""),
        };
        if raw_id.is_empty() {
            return Ok(Some(DELAY_USAGE.to_owned()));
        }
        let id: BookingId = parse_id(raw_id, DELAY_USAGE)?;
        let reason = if reason.is_empty() {
            "Not specified"
        } else {
            reason
        };

        let view = self
            .state
            .booking_actions()
            .report_delay(trucker, id, reason)
            .await?;
        Ok(Some(format!(
            "⏰ *Delay Reported*\n\n*Booking:* {}\n*Route:* {}\n*Reason:* {reason}\n\nThe shipper has been informed. Drive safe!",
            view.booking.id,
            view.load.route()
        )))
    }

    pub(super) async fn negotiate(
        &self,
        trucker: &Trucker,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        let (Some(raw_id), Some(raw_price)) = id_and_code(args) else {
            return Ok(Some(NEGOTIATE_USAGE.to_owned()));
        };
        let load_id: LoadId = parse_id(raw_id, NEGOTIATE_USAGE)?;
        let Some(requested) = parse_amount(raw_price) else {
            return Ok(Some(NEGOTIATE_USAGE.to_owned()));
        };

        let load = match self
            .state
            .booking_actions()
            .negotiate(trucker, load_id, requested)
            .await
        {
            Ok(load) => load,
            Err(ChatServiceError::LoadNotAvailable) => {
                return Ok(Some(
                    "❌ This load is no longer available for negotiation.".to_owned(),
                ));
            }
            Err(e) => return Err(e),
        };
        let difference = (requested - load.price) / load.price * 100.0;
        Ok(Some(format!(
            "💰 *Price Negotiation Sent*\n\n*Load:* {}\n*Route:* {}\n*Current price:* {}\n*Your offer:* {} ({difference:+.1}%)\n\nThe shipper will respond shortly.",
            load.id,
            load.route(),
            rupees(load.price),
            rupees(requested)
        )))
    }

    pub(super) async fn emergency(&self, identity: &Identity) -> Result<Reply, ChatServiceError> {
        let mut out = String::from("🚨 *EMERGENCY ALERT RECEIVED*\n\n");
        if let Identity::Trucker(trucker) = identity {
            match self.state.booking_actions().emergency(trucker).await? {
                Some(view) => out.push_str(&format!(
                    "Your shipper for {} ({}) has been alerted.\n\n",
                    view.booking.id,
                    view.load.route()
                )),
                None => out.push_str("Our support team has been alerted.\n\n"),
            }
        } else {
            out.push_str("Our support team has been alerted.\n\n");
        }
        out.push_str(
            "📞 CargoLink Hotline: 1800-XXX-XXXX\n🚓 Police: 100\n🚑 Ambulance: 108\n\nShare your live location so we can reach you faster.",
        );
        Ok(Some(out))
    }

    pub(super) async fn breakdown(&self, trucker: &Trucker) -> Result<Reply, ChatServiceError> {
        let trip = self.state.booking_actions().breakdown(trucker).await?;
        let mut out = String::from("🔧 *Breakdown Assistance*\n\n");
        if let Some(view) = trip {
            out.push_str(&format!(
                "The shipper for {} has been informed.\n\n",
                view.booking.id
            ));
        }
        out.push_str(
            "What's the issue?\n\n1️⃣ Flat tyre\n2️⃣ Engine problem\n3️⃣ Accident\n4️⃣ Other\n\nType SUPPORT <details> and our team will arrange help.",
        );
        Ok(Some(out))
    }
}
