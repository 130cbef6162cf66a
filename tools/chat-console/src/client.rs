//! Thin client for the chat service's test endpoint.

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct Outgoing<'a> {
    from: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    button_payload: Option<&'a str>,
}

/// What the service answered for one message.
#[derive(Debug, Deserialize)]
pub struct Answer {
    pub success: bool,
    pub mode: String,
    pub reply: Option<String>,
}

pub struct ChatClient {
    client: Client,
    url: String,
    from: String,
}

impl ChatClient {
    pub fn new(base_url: &str, from: &str) -> Self {
        Self {
            client: Client::new(),
            url: format!("{}/whatsapp/test", base_url.trim_end_matches('/')),
            from: from.to_owned(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send `line` as typed. `!payload` sends a button tap instead of text.
    pub async fn send(&self, line: &str) -> Result<Answer> {
        let outgoing = match line.strip_prefix('!') {
            Some(payload) => Outgoing {
                from: &self.from,
                body: "",
                button_payload: Some(payload.trim()),
            },
            None => Outgoing {
                from: &self.from,
                body: line,
                button_payload: None,
            },
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&outgoing)
            .send()
            .await
            .with_context(|| format!("POST {}", self.url))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("service answered {status}: {body}");
        }
        resp.json().await.context("decode test endpoint response")
    }
}
