use std::time::Duration;

use anyhow::Context as _;
use tracing::{debug, info, warn};

use crate::domain::repository::Notifier;
use crate::error::ChatServiceError;
use crate::infra::templates;

#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number without the `whatsapp:` prefix.
    pub from: String,
}

/// WhatsApp delivery through the Twilio Messages API.
///
/// Without credentials the notifier is disabled: sends are logged and reported
/// as delivered so local runs work offline.
pub struct TwilioNotifier {
    client: reqwest::Client,
    api_base: String,
    credentials: Option<TwilioCredentials>,
}

impl TwilioNotifier {
    pub fn new(
        api_base: impl Into<String>,
        credentials: Option<TwilioCredentials>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("build http client")?;
        if credentials.is_none() {
            warn!("twilio credentials not set; outbound messages are disabled");
        }
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            credentials,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    async fn post(
        &self,
        creds: &TwilioCredentials,
        form: &[(&str, String)],
    ) -> Result<(), ChatServiceError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, creds.account_sid
        );
        let response = self
            .client
            .post(url)
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(form)
            .send()
            .await
            .map_err(|e| ChatServiceError::Notification(format!("send: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatServiceError::Notification(format!(
                "twilio returned {status}: {body}"
            )));
        }
        Ok(())
    }
}

impl Notifier for TwilioNotifier {
    async fn send_template(
        &self,
        phone: &str,
        template: &str,
        params: &[(&'static str, String)],
    ) -> Result<(), ChatServiceError> {
        let spec = templates::lookup(template).ok_or_else(|| {
            ChatServiceError::Notification(format!("unknown template {template}"))
        })?;
        let variables = templates::content_variables(spec, params)?;

        let Some(creds) = &self.credentials else {
            info!(phone, template, "twilio disabled; template not sent");
            return Ok(());
        };
        let form = [
            ("From", format!("whatsapp:{}", creds.from)),
            ("To", format!("whatsapp:{phone}")),
            ("ContentSid", spec.content_sid.to_owned()),
            ("ContentVariables", variables.to_string()),
        ];
        self.post(creds, &form).await?;
        debug!(phone, template, "template sent");
        Ok(())
    }

    async fn send_text(&self, phone: &str, body: &str) -> Result<(), ChatServiceError> {
        let Some(creds) = &self.credentials else {
            info!(phone, "twilio disabled; text not sent");
            return Ok(());
        };
        let form = [
            ("From", format!("whatsapp:{}", creds.from)),
            ("To", format!("whatsapp:{phone}")),
            ("Body", body.to_owned()),
        ];
        self.post(creds, &form).await?;
        debug!(phone, "text sent");
        Ok(())
    }
}
