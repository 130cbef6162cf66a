use std::str::FromStr;

use anyhow::{Context as _, bail};

use crate::infra::twilio::TwilioCredentials;
use crate::state::InteractionMode;

/// Chat service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ChatConfig {
    /// TCP port for the HTTP server (default 8080). Env var: `CHAT_PORT`.
    pub chat_port: u16,
    /// PostgreSQL connection URL. Required unless the memory store is selected.
    pub database_url: Option<String>,
    /// Keep everything in process memory. Env var: `USE_MEMORY_STORE`.
    pub use_memory_store: bool,
    /// `guided` (default) or `legacy`. Env var: `INTERACTION_MODE`.
    pub interaction_mode: InteractionMode,
    /// Set only when all three `TWILIO_*` credentials are present.
    pub twilio: Option<TwilioCredentials>,
    pub twilio_api_base: String,
    pub session_ttl_minutes: i64,
    pub session_sweep_secs: u64,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid {name}: {raw}")),
        None => Ok(default),
    }
}

impl ChatConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let use_memory_store = matches!(
            var("USE_MEMORY_STORE").as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("true" | "1" | "yes")
        );
        let database_url = var("DATABASE_URL");
        if database_url.is_none() && !use_memory_store {
            bail!("DATABASE_URL is required unless USE_MEMORY_STORE=true");
        }

        let twilio = match (
            var("TWILIO_ACCOUNT_SID"),
            var("TWILIO_AUTH_TOKEN"),
            var("TWILIO_WHATSAPP_FROM"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from: from.trim_start_matches("whatsapp:").to_owned(),
            }),
            _ => None,
        };

        let session_ttl_minutes = parsed("SESSION_TTL_MINUTES", 30)?;
        if session_ttl_minutes <= 0 {
            bail!("SESSION_TTL_MINUTES must be positive");
        }
        let session_sweep_secs = parsed("SESSION_SWEEP_SECS", 300)?;
        if session_sweep_secs == 0 {
            bail!("SESSION_SWEEP_SECS must be positive");
        }

        Ok(Self {
            chat_port: parsed("CHAT_PORT", 8080)?,
            database_url,
            use_memory_store,
            interaction_mode: parsed("INTERACTION_MODE", InteractionMode::Guided)?,
            twilio,
            twilio_api_base: var("TWILIO_API_BASE")
                .unwrap_or_else(|| "https://api.twilio.com".to_owned()),
            session_ttl_minutes,
            session_sweep_secs,
        })
    }
}
