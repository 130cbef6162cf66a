//! Approved WhatsApp content templates.
//!
//! Each template has a content SID and an ordered list of named parameters.
//! The provider addresses parameters positionally (`"1"`, `"2"`, ...), in the
//! order listed here.

use serde_json::{Map, Value};

use crate::error::ChatServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub content_sid: &'static str,
    pub params: &'static [&'static str],
}

pub const CATALOG: &[Template] = &[
    Template {
        name: "new_user_welcome",
        content_sid: "HX9e3c1f89b63fcca20366bae6b929ec87",
        params: &[],
    },
    Template {
        name: "trucker_registration_name",
        content_sid: "HX788b577b3ec0e48f0d3e677db8d14d5d",
        params: &[],
    },
    Template {
        name: "vehicle_type_selection",
        content_sid: "HX20b60e5931450edd071cde08ba5e7774",
        params: &[],
    },
    Template {
        name: "vehicle_type_selection_more",
        content_sid: "HXcd56d35b153c46249a86999c48133f23",
        params: &[],
    },
    Template {
        name: "registration_confirmation",
        content_sid: "HX6b4934d86a771f2d08053cdf34a69f69",
        params: &["name", "vehicle_number", "vehicle_type", "capacity"],
    },
    Template {
        name: "registration_success",
        content_sid: "HX35ef139e281e6cbe5d40289a65d7a5f6",
        params: &["name", "user_id", "vehicle_number"],
    },
    Template {
        name: "welcome_trucker",
        content_sid: "HX810a291483b94d1bef97384e90d75d06",
        params: &["name"],
    },
    Template {
        name: "trucker_main_menu",
        content_sid: "HXf3e91c01396d3a0dd8a3df21626f350d",
        params: &["greeting", "name"],
    },
    Template {
        name: "session_expired",
        content_sid: "HX50694296a3c4c48b625930edb62816c6",
        params: &["name", "session_duration", "last_activity"],
    },
    Template {
        name: "trucker_booked_notification",
        content_sid: "HX47e05263be82ccfcf1dc742cfa2ad048",
        params: &["trucker_name", "load_id", "route", "amount"],
    },
    Template {
        name: "delivery_notification_shipper",
        content_sid: "HX76b216121ff7a0d87323e6613c908345",
        params: &["load_id", "delivery_time", "trucker_name"],
    },
    Template {
        name: "trucker_arrived_notify",
        content_sid: "HXe6c3cbc1e7a696f064edca198de05f10",
        params: &["trucker_name", "vehicle_number", "booking_id"],
    },
    Template {
        name: "shipper_otp_share_v2",
        content_sid: "HX836dc551fded3fb3038daf655144a363",
        params: &["otp", "trucker_name", "booking_id"],
    },
    Template {
        name: "pickup_completed",
        content_sid: "HX3edf55dceb9d1cd7179c98d634413224",
        params: &["booking_id", "pickup_time"],
    },
    Template {
        name: "delivery_confirmation",
        content_sid: "HXc181e33f1b0320a1e31d9c0c0d31fadb",
        params: &["booking_id", "delivered_at", "amount"],
    },
    Template {
        name: "rate_experience",
        content_sid: "HXdb9a092550107764d3030340760d1f60",
        params: &["booking_id", "route"],
    },
    Template {
        name: "booking_cancelled",
        content_sid: "HX844446a76eed6e4404926312feac533a",
        params: &["booking_id", "reason"],
    },
    Template {
        name: "load_posted_confirm",
        content_sid: "HX4154cdd87874ed19216457f3bce90109",
        params: &["load_id", "route", "price"],
    },
    Template {
        name: "load_match_notification",
        content_sid: "HX96787d7ad76432fa238d6101b733fdd6",
        params: &["route", "price", "load_id"],
    },
    Template {
        name: "emergency_sos",
        content_sid: "HX7241f24041c5b415ebd2d2b5b914a64d",
        params: &["trucker_name", "location", "vehicle_number"],
    },
    Template {
        name: "trucker_delayed",
        content_sid: "HXf1476dc22fee732cdc58de7af342eb32",
        params: &["booking_id", "new_eta", "reason"],
    },
    Template {
        name: "price_negotiation_request",
        content_sid: "HXd58d99f56d21070706f6e7d966177d39",
        params: &["trucker_name", "load_id", "current_price", "requested_price"],
    },
    Template {
        name: "breakdown_assistance",
        content_sid: "HX3b350931197012609eac18182f519069",
        params: &["trucker_name", "location", "issue"],
    },
    Template {
        name: "support_ticket_update",
        content_sid: "HXa66e11c65043ad67c47bb0bef506ed9b",
        params: &["ticket_id", "status", "message"],
    },
    Template {
        name: "welcome_message",
        content_sid: "HX44dec15f87f391428a523a9c4bddd83d",
        params: &[],
    },
];

pub fn lookup(name: &str) -> Option<&'static Template> {
    CATALOG.iter().find(|t| t.name == name)
}

/// Build the positional `ContentVariables` object for `template`.
///
/// Fails when a declared parameter is missing from `params`. Extra parameters
/// are ignored.
pub fn content_variables(
    template: &Template,
    params: &[(&'static str, String)],
) -> Result<Value, ChatServiceError> {
    let mut vars = Map::new();
    for (i, name) in template.params.iter().enumerate() {
        let value = params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| {
                ChatServiceError::Notification(format!(
                    "template {} missing parameter {name}",
                    template.name
                ))
            })?;
        vars.insert((i + 1).to_string(), Value::String(value));
    }
    Ok(Value::Object(vars))
}
