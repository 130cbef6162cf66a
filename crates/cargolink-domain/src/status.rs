//! Lifecycle states for loads, bookings, payments and one-time codes.

use serde::{Deserialize, Serialize};

/// Booking lifecycle.
///
/// `Confirmed → InTransit → Delivered → Completed`; `Cancelled` only from `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    InTransit,
    Delivered,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(Self::Confirmed),
            "in_transit" => Some(Self::InTransit),
            "delivered" => Some(Self::Delivered),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Confirmed, Self::InTransit)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::InTransit, Self::Delivered)
                | (Self::Delivered, Self::Completed)
        )
    }

    /// Confirmed or in transit: the trucker is still busy with it.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Confirmed | Self::InTransit)
    }
}

/// Payment state attached to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Escrow,
    Released,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Escrow => "escrow",
            Self::Released => "released",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "escrow" => Some(Self::Escrow),
            "released" => Some(Self::Released),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Load availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Available,
    Booked,
    Completed,
}

impl LoadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "booked" => Some(Self::Booked),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// What a one-time code gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    #[serde(rename = "booking_pickup")]
    Pickup,
    #[serde(rename = "booking_delivery")]
    Delivery,
    Registration,
}

impl OtpPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "booking_pickup",
            Self::Delivery => "booking_delivery",
            Self::Registration => "registration",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "booking_pickup" => Some(Self::Pickup),
            "booking_delivery" => Some(Self::Delivery),
            "registration" => Some(Self::Registration),
            _ => None,
        }
    }
}
