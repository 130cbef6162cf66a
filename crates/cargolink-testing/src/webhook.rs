//! Builders for inbound chat messages.

use serde::Serialize;

use crate::phone::whatsapp_address;

/// Form body of the provider's inbound-message webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookForm {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "ButtonPayload", skip_serializing_if = "Option::is_none")]
    pub button_payload: Option<String>,
    #[serde(rename = "MessageSid")]
    pub message_sid: String,
}

impl WebhookForm {
    /// A plain text message from `phone`.
    pub fn text(phone: &str, body: &str) -> Self {
        Self {
            from: whatsapp_address(phone),
            body: body.to_owned(),
            button_payload: None,
            message_sid: "SM00000000000000000000000000000000".to_owned(),
        }
    }

    /// A quick-reply button tap from `phone`.
    pub fn button(phone: &str, payload: &str) -> Self {
        Self {
            button_payload: Some(payload.to_owned()),
            ..Self::text(phone, "")
        }
    }
}

/// JSON body of the local test endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TestMessage {
    pub from: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_payload: Option<String>,
}

impl TestMessage {
    pub fn text(phone: &str, body: &str) -> Self {
        Self {
            from: phone.to_owned(),
            body: body.to_owned(),
            button_payload: None,
        }
    }

    pub fn button(phone: &str, payload: &str) -> Self {
        Self {
            from: phone.to_owned(),
            body: String::new(),
            button_payload: Some(payload.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_provider_field_names() {
        let json = serde_json::to_value(WebhookForm::button("+911", "role_trucker")).unwrap();
        assert_eq!(json["From"], "whatsapp:+911");
        assert_eq!(json["ButtonPayload"], "role_trucker");
        assert_eq!(json["Body"], "");
    }

    #[test]
    fn should_omit_missing_payload() {
        let json = serde_json::to_value(TestMessage::text("+911", "hi")).unwrap();
        assert!(json.get("button_payload").is_none());
    }
}
