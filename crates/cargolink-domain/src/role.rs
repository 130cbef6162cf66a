//! Conversation participant roles.

use serde::{Deserialize, Serialize};

/// Role of the person behind a phone number.
///
/// `Unknown` until the phone is matched to a registered trucker or shipper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Unknown,
    Trucker,
    Shipper,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Trucker => "trucker",
            Self::Shipper => "shipper",
        }
    }

    /// Parse the wire value. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(Self::Unknown),
            "trucker" => Some(Self::Trucker),
            "shipper" => Some(Self::Shipper),
            _ => None,
        }
    }

    pub fn is_registered(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}
