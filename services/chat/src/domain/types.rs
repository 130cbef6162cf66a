use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cargolink_domain::id::{BookingId, LoadId, ShipperId, TicketId, TruckerId};
use cargolink_domain::status::{BookingStatus, LoadStatus, OtpPurpose, PaymentStatus};

use crate::error::ChatServiceError;

/// Idle time after which a session expires.
pub const SESSION_TTL_MINUTES: i64 = 30;
/// How long an issued one-time code stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;
/// Digits in a one-time code.
pub const OTP_LEN: usize = 6;
/// Verification attempts allowed per code; the next one is rejected even if correct.
pub const MAX_OTP_ATTEMPTS: i32 = 3;
/// Platform share of the agreed price.
pub const COMMISSION_RATE: f64 = 0.05;
/// Informational penalty quoted on cancellation, in rupees.
pub const CANCELLATION_PENALTY: u32 = 500;

/// `(commission, net_amount)` for an agreed price.
pub fn commission_split(agreed_price: f64) -> (f64, f64) {
    let commission = agreed_price * COMMISSION_RATE;
    (commission, agreed_price - commission)
}

/// Rupee amount the way chat messages show it, e.g. `₹35000`.
pub fn rupees(amount: f64) -> String {
    format!("₹{amount:.0}")
}

// ── Truckers ─────────────────────────────────────────────────────────────────

/// A registered truck owner or driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trucker {
    pub id: TruckerId,
    pub name: String,
    pub phone: String,
    pub vehicle_no: String,
    pub vehicle_type: String,
    pub capacity: f64,
    pub verified: bool,
    pub rating: f64,
    pub total_trips: i32,
    pub current_city: Option<String>,
    /// `false` while the trucker holds a confirmed or in-transit booking.
    pub available: bool,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTrucker {
    pub name: String,
    pub phone: String,
    pub vehicle_no: String,
    pub vehicle_type: String,
    pub capacity: f64,
}

// ── Shippers ─────────────────────────────────────────────────────────────────

/// A registered business that posts loads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shipper {
    pub id: ShipperId,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub gst_number: String,
    pub phone: String,
    pub state: String,
    pub verified: bool,
    pub active: bool,
    pub total_loads: i32,
    pub rating: f64,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewShipper {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub gst_number: String,
    pub phone: String,
    pub state: String,
}

// ── Loads ────────────────────────────────────────────────────────────────────

/// Freight posted by a shipper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Load {
    pub id: LoadId,
    pub shipper_id: ShipperId,
    pub shipper_name: String,
    pub shipper_phone: String,
    pub from_city: String,
    pub to_city: String,
    pub material: String,
    pub weight: f64,
    pub vehicle_type: String,
    pub price: f64,
    pub loading_date: NaiveDate,
    pub status: LoadStatus,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl Load {
    /// `Chennai → Bangalore`.
    pub fn route(&self) -> String {
        format!("{} → {}", self.from_city, self.to_city)
    }
}

#[derive(Debug, Clone)]
pub struct NewLoad {
    pub shipper_id: ShipperId,
    pub shipper_name: String,
    pub shipper_phone: String,
    pub from_city: String,
    pub to_city: String,
    pub material: String,
    pub weight: f64,
    pub vehicle_type: String,
    pub price: f64,
    pub loading_date: NaiveDate,
}

/// Filter for available loads. Empty fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadSearch {
    pub from_city: Option<String>,
    pub to_city: Option<String>,
    pub vehicle_type: Option<String>,
    pub date_from: Option<NaiveDate>,
}

impl LoadSearch {
    /// Whether an available load passes every set filter.
    pub fn matches(&self, load: &Load) -> bool {
        fn same(filter: Option<&str>, value: &str) -> bool {
            filter.is_none_or(|f| f.trim().is_empty() || f.trim().eq_ignore_ascii_case(value))
        }

        load.status == LoadStatus::Available
            && same(self.from_city.as_deref(), &load.from_city)
            && same(self.to_city.as_deref(), &load.to_city)
            && self.vehicle_type.as_deref().is_none_or(|v| {
                load.vehicle_type
                    .to_lowercase()
                    .contains(&v.trim().to_lowercase())
            })
            && self.date_from.is_none_or(|d| load.loading_date >= d)
    }
}

// ── Bookings ─────────────────────────────────────────────────────────────────

/// A trucker's commitment to carry a load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub id: BookingId,
    pub load_id: LoadId,
    pub trucker_id: TruckerId,
    pub shipper_id: ShipperId,
    pub agreed_price: f64,
    pub commission: f64,
    pub net_amount: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub confirmed_at: DateTime<Utc>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Next command the trucker should send, if any.
    pub fn next_action_hint(&self) -> Option<String> {
        match self.status {
            BookingStatus::Confirmed if self.picked_up_at.is_none() => {
                Some(format!("ARRIVED {}", self.id))
            }
            BookingStatus::InTransit if self.delivered_at.is_none() => {
                Some(format!("DELIVER {}", self.id))
            }
            _ => None,
        }
    }
}

/// A lifecycle step after booking. Storage applies it only while the booking is
/// still in [`from`](Self::from), together with its load and trucker effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingTransition {
    Pickup,
    Deliver,
    Cancel,
    Complete,
}

impl BookingTransition {
    /// Status the booking must be in for the step to apply.
    pub fn from(self) -> BookingStatus {
        match self {
            Self::Pickup | Self::Cancel => BookingStatus::Confirmed,
            Self::Deliver => BookingStatus::InTransit,
            Self::Complete => BookingStatus::Delivered,
        }
    }

    pub fn to(self) -> BookingStatus {
        match self {
            Self::Pickup => BookingStatus::InTransit,
            Self::Deliver => BookingStatus::Delivered,
            Self::Cancel => BookingStatus::Cancelled,
            Self::Complete => BookingStatus::Completed,
        }
    }

    /// New status of the carried load, if the step changes it.
    pub fn load_status(self) -> Option<LoadStatus> {
        match self {
            Self::Deliver => Some(LoadStatus::Completed),
            Self::Cancel => Some(LoadStatus::Available),
            Self::Pickup | Self::Complete => None,
        }
    }

    /// `Some(trip_completed)` when the step frees the trucker.
    pub fn releases_trucker(self) -> Option<bool> {
        match self {
            Self::Deliver => Some(true),
            Self::Cancel => Some(false),
            Self::Pickup | Self::Complete => None,
        }
    }

    /// Move `booking` to [`to`](Self::to) and stamp the matching timestamp.
    pub fn apply(self, booking: &mut Booking, now: DateTime<Utc>) {
        booking.status = self.to();
        booking.updated_at = now;
        match self {
            Self::Pickup => booking.picked_up_at = Some(now),
            Self::Deliver => {
                booking.delivered_at = Some(now);
                booking.payment_status = PaymentStatus::Pending;
            }
            Self::Cancel => booking.cancelled_at = Some(now),
            Self::Complete => {
                booking.completed_at = Some(now);
                booking.payment_status = PaymentStatus::Completed;
            }
        }
    }

    /// Why the step cannot apply to a booking in `current`.
    pub fn conflict(self, current: BookingStatus) -> ChatServiceError {
        match (self, current) {
            (_, BookingStatus::Cancelled) => ChatServiceError::BookingCancelled,
            (Self::Pickup | Self::Cancel, _) => ChatServiceError::AlreadyPickedUp,
            (Self::Deliver, BookingStatus::Confirmed) => ChatServiceError::NotPickedUp,
            (Self::Deliver, _) => ChatServiceError::AlreadyDelivered,
            (Self::Complete, _) => ChatServiceError::NotDelivered,
        }
    }
}

// ── One-time codes ───────────────────────────────────────────────────────────

/// A short-lived code gating a physical checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Otp {
    pub id: Uuid,
    pub phone: String,
    pub code: String,
    pub purpose: OtpPurpose,
    pub reference_id: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    /// Set when a newer code for the same phone and purpose supersedes this one.
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Otp {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at || self.revoked_at.is_some()
    }

    /// Still eligible for verification: unused and not superseded.
    pub fn is_active(&self) -> bool {
        !self.used && self.revoked_at.is_none()
    }
}

// ── Support ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportTicket {
    pub id: TicketId,
    pub user_phone: String,
    pub user_type: String,
    pub user_id: String,
    pub issue_type: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    #[serde(serialize_with = "cargolink_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSupportTicket {
    pub user_phone: String,
    pub user_type: String,
    pub user_id: String,
    pub issue_type: String,
    pub description: String,
    pub status: String,
    pub priority: String,
}
