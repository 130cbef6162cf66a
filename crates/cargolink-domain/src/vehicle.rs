//! Vehicle categories offered in the guided registration menu.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    MiniTruck,
    LightTruck,
    HeavyTruck,
    Trailer,
    Container,
    Other,
}

impl VehicleType {
    /// Menu order, matching the numbers `1`–`6` shown to the user.
    pub const ALL: [Self; 6] = [
        Self::MiniTruck,
        Self::LightTruck,
        Self::HeavyTruck,
        Self::Trailer,
        Self::Container,
        Self::Other,
    ];

    /// Display label stored on the trucker record.
    pub fn label(self) -> &'static str {
        match self {
            Self::MiniTruck => "Mini Truck",
            Self::LightTruck => "Light Truck",
            Self::HeavyTruck => "Heavy Truck",
            Self::Trailer => "Trailer",
            Self::Container => "Container",
            Self::Other => "Other",
        }
    }

    /// Button payload of the selection template.
    pub fn payload(self) -> &'static str {
        match self {
            Self::MiniTruck => "vehicle_mini",
            Self::LightTruck => "vehicle_light",
            Self::HeavyTruck => "vehicle_heavy",
            Self::Trailer => "vehicle_trailer",
            Self::Container => "vehicle_container",
            Self::Other => "vehicle_other",
        }
    }

    pub fn from_payload(payload: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.payload() == payload)
    }

    /// `1`–`6` from the numbered text menu.
    pub fn from_menu_number(text: &str) -> Option<Self> {
        let n: usize = text.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    /// Free-text match: the reply contains a category keyword.
    pub fn from_text(text: &str) -> Option<Self> {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        if lower.contains("mini") {
            Some(Self::MiniTruck)
        } else if lower.contains("light") {
            Some(Self::LightTruck)
        } else if lower.contains("heavy") {
            Some(Self::HeavyTruck)
        } else if lower.contains("trailer") {
            Some(Self::Trailer)
        } else if lower.contains("container") {
            Some(Self::Container)
        } else if lower.contains("other") {
            Some(Self::Other)
        } else {
            None
        }
    }

    /// Resolve a reply in order: button payload, menu number, free text.
    pub fn resolve(payload: Option<&str>, text: &str) -> Option<Self> {
        payload
            .and_then(Self::from_payload)
            .or_else(|| Self::from_menu_number(text))
            .or_else(|| Self::from_text(text))
    }
}
