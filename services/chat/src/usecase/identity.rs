use cargolink_domain::role::UserRole;

use crate::domain::repository::Storage;
use crate::domain::types::{Shipper, Trucker};
use crate::error::ChatServiceError;

/// Who a phone number belongs to.
#[derive(Debug, Clone)]
pub enum Identity {
    Trucker(Trucker),
    Shipper(Shipper),
    Unknown,
}

impl Identity {
    pub fn role(&self) -> UserRole {
        match self {
            Self::Trucker(_) => UserRole::Trucker,
            Self::Shipper(_) => UserRole::Shipper,
            Self::Unknown => UserRole::Unknown,
        }
    }

    pub fn user_id(&self) -> Option<String> {
        match self {
            Self::Trucker(t) => Some(t.id.to_string()),
            Self::Shipper(s) => Some(s.id.to_string()),
            Self::Unknown => None,
        }
    }

    /// Display name: the trucker's name or the shipper's company.
    pub fn name(&self) -> &str {
        match self {
            Self::Trucker(t) => &t.name,
            Self::Shipper(s) => &s.company_name,
            Self::Unknown => "",
        }
    }
}

/// Look the phone up as a trucker first, then as a shipper.
///
/// Registration keeps phones unique across both roles, so at most one matches.
pub async fn resolve<S: Storage>(store: &S, phone: &str) -> Result<Identity, ChatServiceError> {
    if let Some(trucker) = store.get_trucker_by_phone(phone).await? {
        return Ok(Identity::Trucker(trucker));
    }
    Ok(store
        .get_shipper_by_phone(phone)
        .await?
        .map_or(Identity::Unknown, Identity::Shipper))
}
