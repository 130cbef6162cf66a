use std::sync::Arc;

use tracing::info;

use cargolink_domain::gst::{is_valid_gst, normalize_gst, state_from_gst};

use crate::domain::repository::Storage;
use crate::domain::types::{NewShipper, NewTrucker, Shipper, Trucker};
use crate::error::ChatServiceError;

const MIN_NAME_LEN: usize = 3;
const VEHICLE_NO_LEN: std::ops::RangeInclusive<usize> = 6..=15;
const MAX_CAPACITY_TONS: f64 = 100.0;

// ── Field validation ─────────────────────────────────────────────────────────

pub fn validate_person_name(raw: &str) -> Result<String, ChatServiceError> {
    let name = raw.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ChatServiceError::Validation(
            "Please enter your full name (at least 3 characters).".to_owned(),
        ));
    }
    Ok(name.to_owned())
}

pub fn validate_contact_name(raw: &str) -> Result<String, ChatServiceError> {
    validate_person_name(raw).map_err(|_| {
        ChatServiceError::Validation(
            "Please enter the contact person's full name (at least 3 characters).".to_owned(),
        )
    })
}

pub fn validate_company(raw: &str) -> Result<String, ChatServiceError> {
    let company = raw.trim();
    if company.chars().count() < MIN_NAME_LEN {
        return Err(ChatServiceError::Validation(
            "Please enter your full company name (at least 3 characters).".to_owned(),
        ));
    }
    Ok(company.to_owned())
}

/// Upper-cased registration number, 6 to 15 characters.
pub fn validate_vehicle_no(raw: &str) -> Result<String, ChatServiceError> {
    let vehicle_no = raw.trim().to_uppercase();
    if !VEHICLE_NO_LEN.contains(&vehicle_no.chars().count()) {
        return Err(ChatServiceError::Validation(
            "Invalid vehicle number. Please enter a valid registration number.\n\nExample: TN01AB1234"
                .to_owned(),
        ));
    }
    Ok(vehicle_no)
}

/// Tons, in `(0, 100]`. Accepts a trailing unit such as `15 tons`.
pub fn parse_capacity(raw: &str) -> Result<f64, ChatServiceError> {
    let invalid = || {
        ChatServiceError::Validation(
            "Please enter a valid capacity in tons (e.g., 15 or 15.5)".to_owned(),
        )
    };
    let capacity: f64 = raw
        .split_whitespace()
        .next()
        .ok_or_else(invalid)?
        .parse()
        .map_err(|_| invalid())?;
    if !capacity.is_finite() || capacity <= 0.0 || capacity > MAX_CAPACITY_TONS {
        return Err(invalid());
    }
    Ok(capacity)
}

/// Normalized GSTIN and the state its code maps to.
pub fn validate_gst(raw: &str) -> Result<(String, &'static str), ChatServiceError> {
    let gst = normalize_gst(raw);
    if !is_valid_gst(&gst) {
        return Err(ChatServiceError::Validation(
            "Invalid GST format!\n\nGST number must be exactly 15 characters.\n\nExample: 29ABCDE1234F1Z5\n\nPlease enter a valid GST number:"
                .to_owned(),
        ));
    }
    let state = state_from_gst(&gst);
    Ok((gst, state))
}

// ── Registration ─────────────────────────────────────────────────────────────

pub struct Registration<S: Storage> {
    pub store: Arc<S>,
}

impl<S: Storage> Registration<S> {
    pub async fn register_trucker(&self, new: NewTrucker) -> Result<Trucker, ChatServiceError> {
        let trucker = self.store.create_trucker(new).await?;
        info!(
            phone = %trucker.phone,
            trucker_id = %trucker.id,
            vehicle_no = %trucker.vehicle_no,
            "trucker registered"
        );
        Ok(trucker)
    }

    pub async fn register_shipper(&self, new: NewShipper) -> Result<Shipper, ChatServiceError> {
        let shipper = self.store.create_shipper(new).await?;
        info!(
            phone = %shipper.phone,
            shipper_id = %shipper.id,
            gst_number = %shipper.gst_number,
            "shipper registered"
        );
        Ok(shipper)
    }
}
