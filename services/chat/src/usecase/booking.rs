//! Booking lifecycle: book, pickup and delivery checkpoints gated by one-time
//! codes, cancellation and final settlement.
//!
//! Each action commits its state change first and then notifies the
//! counterparty on a best-effort basis. The reply to the acting user is left to
//! the caller.
//!
//! The checks below give early answers only. The commit itself is
//! [`Storage::transition_booking`], which re-checks the status in the same write,
//! so a pickup racing a cancel from the other party cannot both apply.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use cargolink_core::serde::clock_time;
use cargolink_domain::id::{BookingId, LoadId};
use cargolink_domain::status::{BookingStatus, LoadStatus, OtpPurpose};

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::{Booking, BookingTransition, Load, Shipper, Trucker, rupees};
use crate::error::ChatServiceError;
use crate::jobs::deferred::{DeferredMessage, DeferredQueue};
use crate::usecase::notify;
use crate::usecase::otp::OtpVerifier;

/// Delay before asking the trucker to rate a finished trip.
pub const RATING_REQUEST_DELAY: StdDuration = StdDuration::from_secs(120);

/// Who is acting on a booking.
#[derive(Debug, Clone)]
pub enum Actor {
    Trucker(Trucker),
    Shipper(Shipper),
}

/// A booking together with the load it carries.
#[derive(Debug, Clone)]
pub struct BookingView {
    pub booking: Booking,
    pub load: Load,
}

/// Result of reaching a checkpoint: the code the counterparty now holds.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub booking: Booking,
    pub load: Load,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct Delivered {
    pub booking: Booking,
    pub load: Load,
    /// Time between pickup and delivery.
    pub journey: Option<Duration>,
}

/// `5h 12m`.
pub fn format_journey(d: Duration) -> String {
    format!("{}h {}m", d.num_hours(), d.num_minutes() % 60)
}

pub struct BookingActions<S: Storage, N: Notifier> {
    pub store: Arc<S>,
    pub notifier: Arc<N>,
    pub otp: Arc<OtpVerifier<S>>,
    pub deferred: DeferredQueue,
}

impl<S: Storage, N: Notifier> BookingActions<S, N> {
    async fn owned(
        &self,
        trucker: &Trucker,
        id: BookingId,
    ) -> Result<BookingView, ChatServiceError> {
        let booking = self.store.get_booking(id).await?;
        if booking.trucker_id != trucker.id {
            return Err(ChatServiceError::NotBookingOwner);
        }
        let load = self.store.get_load(booking.load_id).await?;
        Ok(BookingView { booking, load })
    }

    /// Check `code` for `id` without consuming it.
    async fn checkpoint_code(
        &self,
        trucker: &Trucker,
        id: BookingId,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<Uuid, ChatServiceError> {
        let otp = self.otp.check(&trucker.phone, code, purpose).await?;
        if otp.reference_id != id.to_string() {
            warn!(booking_id = %id, reference_id = %otp.reference_id, "otp issued for another booking");
            return Err(ChatServiceError::OtpWrongBooking);
        }
        Ok(otp.id)
    }

    // ── Book ─────────────────────────────────────────────────────────────────

    pub async fn book(
        &self,
        trucker: &Trucker,
        load_id: LoadId,
    ) -> Result<BookingView, ChatServiceError> {
        let booking = self.store.create_booking(load_id, trucker.id).await?;
        let load = self.store.get_load(load_id).await?;
        info!(
            booking_id = %booking.id,
            load_id = %load.id,
            trucker_id = %trucker.id,
            "load booked"
        );

        notify::try_template(
            self.notifier.as_ref(),
            &load.shipper_phone,
            "delivery_notification_shipper",
            &[
                ("load_id", load.id.to_string()),
                ("delivery_time", "Within 24-48 hours".to_owned()),
                ("trucker_name", trucker.name.clone()),
            ],
        )
        .await;
        Ok(BookingView { booking, load })
    }

    // ── Pickup ───────────────────────────────────────────────────────────────

    /// The trucker is at the pickup point: issue the pickup code and send it to the
    /// shipper, who hands it over once loading is done.
    pub async fn arrived(
        &self,
        trucker: &Trucker,
        id: BookingId,
    ) -> Result<Checkpoint, ChatServiceError> {
        let BookingView { booking, load } = self.owned(trucker, id).await?;
        if booking.status == BookingStatus::Cancelled {
            return Err(ChatServiceError::BookingCancelled);
        }
        if booking.picked_up_at.is_some() {
            return Err(ChatServiceError::AlreadyPickedUp);
        }

        let otp = self
            .otp
            .issue(&trucker.phone, OtpPurpose::Pickup, &id.to_string())
            .await?;
        info!(booking_id = %id, "trucker arrived at pickup");

        let fallback = format!(
            "🔐 *Pickup OTP for {id}:* {}\n\nTrucker {} ({}) has arrived.\nShare this code once loading is complete.\n⏰ Valid for 10 minutes",
            otp.code, trucker.name, trucker.vehicle_no
        );
        notify::template_or_text(
            self.notifier.as_ref(),
            &load.shipper_phone,
            "shipper_otp_share_v2",
            &[
                ("otp", otp.code.clone()),
                ("trucker_name", trucker.name.clone()),
                ("booking_id", id.to_string()),
            ],
            &fallback,
        )
        .await;

        Ok(Checkpoint {
            booking,
            load,
            code: otp.code,
        })
    }

    pub async fn confirm_pickup(
        &self,
        trucker: &Trucker,
        id: BookingId,
        code: &str,
    ) -> Result<BookingView, ChatServiceError> {
        let BookingView { booking, load } = self.owned(trucker, id).await?;
        if booking.status == BookingStatus::Cancelled {
            return Err(ChatServiceError::BookingCancelled);
        }
        if booking.picked_up_at.is_some() {
            return Err(ChatServiceError::AlreadyPickedUp);
        }

        let otp = self
            .checkpoint_code(trucker, id, code, OtpPurpose::Pickup)
            .await?;
        let booking = self
            .store
            .transition_booking(id, BookingTransition::Pickup, Some(otp))
            .await?;
        let now = booking.picked_up_at.unwrap_or(booking.updated_at);
        info!(booking_id = %id, "pickup confirmed");

        notify::try_template(
            self.notifier.as_ref(),
            &load.shipper_phone,
            "pickup_completed",
            &[
                ("booking_id", id.to_string()),
                ("pickup_time", clock_time(&now)),
            ],
        )
        .await;
        Ok(BookingView { booking, load })
    }

    // ── Delivery ─────────────────────────────────────────────────────────────

    /// The trucker is at the destination: issue the delivery code for the consignee.
    pub async fn reach_destination(
        &self,
        trucker: &Trucker,
        id: BookingId,
    ) -> Result<Checkpoint, ChatServiceError> {
        let BookingView { booking, load } = self.owned(trucker, id).await?;
        Self::ensure_in_transit(&booking)?;

        let otp = self
            .otp
            .issue(&trucker.phone, OtpPurpose::Delivery, &id.to_string())
            .await?;
        info!(booking_id = %id, "trucker arrived at destination");

        let body = format!(
            "🔐 *Delivery OTP for {id}:* {}\n\nRoute: {}\nPlease share this code with the consignee. The driver needs it to confirm delivery.\n⏰ Valid for 10 minutes",
            otp.code,
            load.route()
        );
        notify::text(self.notifier.as_ref(), &load.shipper_phone, &body).await;

        Ok(Checkpoint {
            booking,
            load,
            code: otp.code,
        })
    }

    pub async fn confirm_delivery(
        &self,
        trucker: &Trucker,
        id: BookingId,
        code: &str,
    ) -> Result<Delivered, ChatServiceError> {
        let BookingView { booking, mut load } = self.owned(trucker, id).await?;
        Self::ensure_in_transit(&booking)?;

        let otp = self
            .checkpoint_code(trucker, id, code, OtpPurpose::Delivery)
            .await?;
        let booking = self
            .store
            .transition_booking(id, BookingTransition::Deliver, Some(otp))
            .await?;
        load.status = LoadStatus::Completed;
        let now = booking.delivered_at.unwrap_or(booking.updated_at);
        info!(booking_id = %id, load_id = %load.id, "delivery confirmed");

        notify::try_template(
            self.notifier.as_ref(),
            &load.shipper_phone,
            "delivery_notification_shipper",
            &[
                ("load_id", load.id.to_string()),
                ("delivery_time", clock_time(&now)),
                ("trucker_name", trucker.name.clone()),
            ],
        )
        .await;
        self.deferred.schedule(
            RATING_REQUEST_DELAY,
            DeferredMessage::template(
                &trucker.phone,
                "rate_experience",
                vec![("booking_id", id.to_string()), ("route", load.route())],
            ),
        );

        let journey = booking.picked_up_at.map(|picked| now - picked);
        Ok(Delivered {
            booking,
            load,
            journey,
        })
    }

    fn ensure_in_transit(booking: &Booking) -> Result<(), ChatServiceError> {
        if booking.status == BookingStatus::Cancelled {
            return Err(ChatServiceError::BookingCancelled);
        }
        if booking.picked_up_at.is_none() {
            return Err(ChatServiceError::NotPickedUp);
        }
        if booking.delivered_at.is_some() {
            return Err(ChatServiceError::AlreadyDelivered);
        }
        Ok(())
    }

    // ── Cancel ───────────────────────────────────────────────────────────────

    /// Cancel before pickup. Either party to the booking may cancel; the load goes
    /// back on the market and the trucker is freed.
    pub async fn cancel(&self, actor: &Actor, id: BookingId) -> Result<BookingView, ChatServiceError> {
        let booking = self.store.get_booking(id).await?;
        let owns = match actor {
            Actor::Trucker(t) => booking.trucker_id == t.id,
            Actor::Shipper(s) => booking.shipper_id == s.id,
        };
        if !owns {
            return Err(ChatServiceError::NotBookingOwner);
        }
        match booking.status {
            BookingStatus::Cancelled => return Err(ChatServiceError::BookingCancelled),
            BookingStatus::Confirmed if booking.picked_up_at.is_none() => {}
            _ => return Err(ChatServiceError::AlreadyPickedUp),
        }

        let booking = self
            .store
            .transition_booking(id, BookingTransition::Cancel, None)
            .await?;
        let load = self.store.get_load(booking.load_id).await?;

        let (counterparty, reason) = match actor {
            Actor::Trucker(_) => (load.shipper_phone.clone(), "Cancelled by trucker"),
            Actor::Shipper(_) => (
                self.store.get_trucker(booking.trucker_id).await?.phone,
                "Cancelled by shipper",
            ),
        };
        info!(booking_id = %id, reason, "booking cancelled");

        notify::try_template(
            self.notifier.as_ref(),
            &counterparty,
            "booking_cancelled",
            &[("booking_id", id.to_string()), ("reason", reason.to_owned())],
        )
        .await;
        Ok(BookingView { booking, load })
    }

    // ── Settle ───────────────────────────────────────────────────────────────

    /// Close a delivered booking once payment is released.
    pub async fn complete(&self, id: BookingId) -> Result<Booking, ChatServiceError> {
        let booking = self
            .store
            .transition_booking(id, BookingTransition::Complete, None)
            .await?;
        info!(booking_id = %id, net_amount = %rupees(booking.net_amount), "booking completed");
        Ok(booking)
    }

    // ── Trip incidents ───────────────────────────────────────────────────────

    /// Tell the shipper a booked trip is running late.
    pub async fn report_delay(
        &self,
        trucker: &Trucker,
        id: BookingId,
        reason: &str,
    ) -> Result<BookingView, ChatServiceError> {
        let view = self.owned(trucker, id).await?;
        if !view.booking.status.is_active() {
            return Err(match view.booking.status {
                BookingStatus::Cancelled => ChatServiceError::BookingCancelled,
                _ => ChatServiceError::AlreadyDelivered,
            });
        }
        info!(booking_id = %id, reason, "delay reported");
        notify::try_template(
            self.notifier.as_ref(),
            &view.load.shipper_phone,
            "trucker_delayed",
            &[
                ("booking_id", id.to_string()),
                ("new_eta", "Will update soon".to_owned()),
                ("reason", reason.to_owned()),
            ],
        )
        .await;
        Ok(view)
    }

    /// Forward a counter-offer on an available load to its shipper.
    pub async fn negotiate(
        &self,
        trucker: &Trucker,
        load_id: LoadId,
        requested_price: f64,
    ) -> Result<Load, ChatServiceError> {
        if requested_price.is_nan() || requested_price <= 0.0 {
            return Err(ChatServiceError::Validation(
                "Please enter a valid price.\n\nExample: NEGOTIATE LD00001 40000".to_owned(),
            ));
        }
        let load = self.store.get_load(load_id).await?;
        if load.status != LoadStatus::Available {
            return Err(ChatServiceError::LoadNotAvailable);
        }
        info!(load_id = %load_id, trucker_id = %trucker.id, requested_price, "price negotiation requested");
        notify::try_template(
            self.notifier.as_ref(),
            &load.shipper_phone,
            "price_negotiation_request",
            &[
                ("trucker_name", trucker.name.clone()),
                ("load_id", load_id.to_string()),
                ("current_price", rupees(load.price)),
                ("requested_price", rupees(requested_price)),
            ],
        )
        .await;
        Ok(load)
    }

    /// The trucker's bookings with their loads, newest first.
    pub async fn list_for_trucker(
        &self,
        trucker: &Trucker,
    ) -> Result<Vec<BookingView>, ChatServiceError> {
        let bookings = self.store.list_bookings_by_trucker(trucker.id).await?;
        let mut views = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let load = self.store.get_load(booking.load_id).await?;
            views.push(BookingView { booking, load });
        }
        Ok(views)
    }

    /// The trucker's in-transit booking, if any.
    pub async fn active_trip(&self, trucker: &Trucker) -> Result<Option<BookingView>, ChatServiceError> {
        let bookings = self.store.list_bookings_by_trucker(trucker.id).await?;
        let Some(booking) = bookings
            .into_iter()
            .find(|b| b.status == BookingStatus::InTransit)
        else {
            return Ok(None);
        };
        let load = self.store.get_load(booking.load_id).await?;
        Ok(Some(BookingView { booking, load }))
    }

    /// Raise an SOS. The shipper of an in-transit load is alerted too.
    pub async fn emergency(&self, trucker: &Trucker) -> Result<Option<BookingView>, ChatServiceError> {
        let trip = self.active_trip(trucker).await?;
        warn!(phone = %trucker.phone, trucker_id = %trucker.id, "emergency raised");
        if let Some(view) = &trip {
            notify::try_template(
                self.notifier.as_ref(),
                &view.load.shipper_phone,
                "emergency_sos",
                &[
                    ("trucker_name", trucker.name.clone()),
                    ("location", "Live location requested".to_owned()),
                    ("vehicle_number", trucker.vehicle_no.clone()),
                ],
            )
            .await;
        }
        Ok(trip)
    }

    /// Report a vehicle breakdown. The shipper of an in-transit load is alerted too.
    pub async fn breakdown(&self, trucker: &Trucker) -> Result<Option<BookingView>, ChatServiceError> {
        let trip = self.active_trip(trucker).await?;
        warn!(phone = %trucker.phone, trucker_id = %trucker.id, "breakdown reported");
        if let Some(view) = &trip {
            notify::try_template(
                self.notifier.as_ref(),
                &view.load.shipper_phone,
                "breakdown_assistance",
                &[
                    ("trucker_name", trucker.name.clone()),
                    ("location", "Live location requested".to_owned()),
                    ("issue", format!("Vehicle breakdown on {}", view.load.route())),
                ],
            )
            .await;
        }
        Ok(trip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_journey_as_hours_and_minutes() {
        assert_eq!(format_journey(Duration::minutes(312)), "5h 12m");
        assert_eq!(format_journey(Duration::minutes(7)), "0h 7m");
    }
}
