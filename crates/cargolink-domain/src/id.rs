//! Newtype wrappers for domain identifiers.
//!
//! Every entity is keyed by a sequence number and shown to users with a fixed
//! prefix and five zero-padded digits (`TRK00001`, `LD00042`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a user-supplied identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: {input:?}")]
pub struct IdParseError {
    pub kind: &'static str,
    pub input: String,
}

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub i32);

        impl $name {
            pub const PREFIX: &'static str = $prefix;
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{:05}", $prefix, self.0)
            }
        }

        /// Accepts the prefixed form in any case (`trk00001`) or a bare sequence number.
        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let err = || IdParseError {
                    kind: $kind,
                    input: s.to_owned(),
                };
                let trimmed = s.trim();
                let digits = match trimmed.get(..$prefix.len()) {
                    Some(head) if head.eq_ignore_ascii_case($prefix) => &trimmed[$prefix.len()..],
                    _ => trimmed,
                };
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err());
                }
                digits.parse().map(Self).map_err(|_| err())
            }
        }

        impl From<i32> for $name {
            fn from(seq: i32) -> Self {
                Self(seq)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(d)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

prefixed_id!(
    /// Identifies a registered trucker.
    TruckerId,
    "TRK",
    "trucker"
);

prefixed_id!(
    /// Identifies a registered shipper.
    ShipperId,
    "SH",
    "shipper"
);

prefixed_id!(
    /// Identifies a posted load.
    LoadId,
    "LD",
    "load"
);

prefixed_id!(
    /// Identifies a booking of a load by a trucker.
    BookingId,
    "BK",
    "booking"
);

prefixed_id!(
    /// Identifies a support ticket.
    TicketId,
    "TK",
    "ticket"
);
