//! Stateless keyword commands (`REGISTER`, `LOAD`, `BOOK`, `PICKUP`, ...).
//!
//! Each command produces at most one reply. When the reply goes out as a
//! delivered template there is nothing left to return; when the template fails
//! its plain-text rendering is returned instead.

mod account;
pub mod command;
mod freight;
pub mod reply;
mod trips;

use std::str::FromStr;

use tracing::{debug, info};

use cargolink_domain::phone::normalize_phone;

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::{Shipper, Trucker};
use crate::error::ChatServiceError;
use crate::flow::sync_session;
use crate::state::AppState;
use crate::usecase::identity::{self, Identity};
use crate::usecase::notify;

use self::command::Command;

/// `Some(text)` is sent to the user; `None` means a template already went out.
pub type Reply = Option<String>;

pub struct CommandDispatcher<S: Storage, N: Notifier> {
    state: AppState<S, N>,
}

impl<S: Storage, N: Notifier> CommandDispatcher<S, N> {
    pub fn new(state: AppState<S, N>) -> Self {
        Self { state }
    }

    /// Parse and run one message from `from`.
    ///
    /// Only storage failures come back as `Err`; every other rejection is
    /// rendered into the reply.
    pub async fn dispatch(&self, from: &str, text: &str) -> Result<Reply, ChatServiceError> {
        let phone = normalize_phone(from);
        if phone.is_empty() {
            return Err(ChatServiceError::Validation("missing sender".to_owned()));
        }
        let _turn = self.state.sessions.turn(&phone).await;
        let identity = identity::resolve(self.state.store.as_ref(), &phone).await?;
        sync_session(&self.state.sessions, &phone, &identity).await?;

        let command = Command::parse(text);
        info!(phone, command = command.name(), role = identity.role().as_str(), "command received");
        self.execute(&identity, &phone, command).await
    }

    /// Run an already parsed command for a resolved sender.
    pub async fn execute(
        &self,
        identity: &Identity,
        phone: &str,
        command: Command,
    ) -> Result<Reply, ChatServiceError> {
        match self.run(identity, phone, command).await {
            Err(e) if !e.is_transient() => {
                debug!(phone, kind = e.kind(), "command rejected");
                Ok(Some(e.user_message()))
            }
            other => other,
        }
    }

    async fn run(
        &self,
        identity: &Identity,
        phone: &str,
        command: Command,
    ) -> Result<Reply, ChatServiceError> {
        match command {
            Command::Help | Command::Greeting => {
                notify::try_template(self.state.notifier.as_ref(), phone, "welcome_message", &[])
                    .await;
                Ok(Some(reply::HELP_TEXT.to_owned()))
            }
            Command::RegisterTrucker(args) => self.register_trucker(identity, phone, &args).await,
            Command::RegisterShipper(args) => self.register_shipper(identity, phone, &args).await,
            Command::Support(args) => self.support(identity, phone, &args).await,
            Command::MenuSelection(n) => self.menu_selection(identity, n).await,
            Command::Button(button) => self.button(identity, button).await,
            Command::RegisterHint => Ok(Some(account::REGISTER_HINT.to_owned())),
            Command::LoadHint => Ok(Some(trips::LOAD_HINT.to_owned())),

            Command::Post(args) => self.post(shipper(identity)?, &args).await,
            Command::MyLoads => self.my_loads(shipper(identity)?).await,
            Command::Track(args) => self.track(identity, &args).await,

            Command::Load(args) => self.search(trucker(identity)?, &args).await,
            Command::Book(args) => self.book(trucker(identity)?, &args).await,
            Command::Status => self.status(trucker(identity)?).await,
            Command::Arrived(args) => self.arrived(trucker(identity)?, &args).await,
            Command::Pickup(args) => self.pickup(trucker(identity)?, &args).await,
            Command::Deliver(args) => self.deliver(trucker(identity)?, &args).await,
            Command::Cancel(args) => self.cancel(identity, &args).await,
            Command::Delay(args) => self.delay(trucker(identity)?, &args).await,
            Command::Negotiate(args) => self.negotiate(trucker(identity)?, &args).await,
            Command::Emergency => self.emergency(identity).await,
            Command::Breakdown => self.breakdown(trucker(identity)?).await,

            Command::Invalid(msg) => Ok(Some(format!(
                "❌ Invalid command: '{msg}'\n\nType HELP to see all available commands."
            ))),
        }
    }

    /// Send `template`; hand back `fallback` only if it could not be delivered.
    async fn reply_template(
        &self,
        phone: &str,
        template: &str,
        params: &[(&'static str, String)],
        fallback: String,
    ) -> Reply {
        if notify::try_template(self.state.notifier.as_ref(), phone, template, params).await {
            None
        } else {
            Some(fallback)
        }
    }
}

fn trucker(identity: &Identity) -> Result<&Trucker, ChatServiceError> {
    match identity {
        Identity::Trucker(t) => Ok(t),
        _ => Err(ChatServiceError::TruckerNotFound),
    }
}

fn shipper(identity: &Identity) -> Result<&Shipper, ChatServiceError> {
    match identity {
        Identity::Shipper(s) => Ok(s),
        _ => Err(ChatServiceError::ShipperNotFound),
    }
}

/// First whitespace-separated token of `args` as an identifier, or `usage` as
/// the rejection.
fn parse_id<T: FromStr>(args: &str, usage: &str) -> Result<T, ChatServiceError> {
    args.split_whitespace()
        .next()
        .and_then(|raw| raw.to_uppercase().parse().ok())
        .ok_or_else(|| ChatServiceError::Validation(usage.to_owned()))
}

/// Rupee amount as typed, tolerating a currency sign and digit grouping.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '₹'))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
