//! Guided conversations: one inbound message advances the sender's dialogue by
//! one step, or hands off to the next dialogue in the same turn.

pub mod main_menu;
pub mod shipper_registration;
pub mod trucker_registration;
pub mod welcome;

use serde::Deserialize;
use tracing::{debug, error, info};

use cargolink_domain::phone::normalize_phone;

use crate::domain::repository::{Notifier, Storage};
use crate::error::ChatServiceError;
use crate::legacy::command::Command;
use crate::session::{FlowState, Session, SessionStore};
use crate::state::AppState;
use crate::usecase::identity::{self, Identity};
use crate::usecase::notify;

/// Hand-offs allowed within one turn before the router gives up.
const MAX_HANDOFFS: usize = 4;

/// One message as received from the transport.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Inbound {
    pub from: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub button_payload: Option<String>,
}

impl Inbound {
    pub fn text(from: &str, body: &str) -> Self {
        Self {
            from: from.to_owned(),
            body: body.to_owned(),
            button_payload: None,
        }
    }

    pub fn button(from: &str, payload: &str) -> Self {
        Self {
            from: from.to_owned(),
            body: String::new(),
            button_payload: Some(payload.to_owned()),
        }
    }

    fn input(&self) -> StepInput<'_> {
        StepInput {
            text: self.body.trim(),
            payload: self
                .button_payload
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty()),
        }
    }

    /// What a keyword parser should read: the button payload when present, else the body.
    pub fn command_text(&self) -> &str {
        let input = self.input();
        input.payload.unwrap_or(input.text)
    }
}

/// Trimmed text and button payload a step reacts to.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub text: &'a str,
    pub payload: Option<&'a str>,
}

impl StepInput<'_> {
    /// Input for a step entered by hand-off within the same turn.
    pub const EMPTY: StepInput<'static> = StepInput {
        text: "",
        payload: None,
    };
}

/// What a step handler asks the router to do with the session.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Keep the current state; the user answers the same step again.
    Stay,
    /// Store the next state and wait for the next message.
    Advance(FlowState),
    /// Store the next state and run it now with empty input.
    Handoff(FlowState),
    /// Clear the dialogue; the session now belongs to a known user.
    Finish,
}

/// YES/NO gate shared by both registration dialogues.
pub(crate) fn parse_confirmation(input: StepInput<'_>) -> Option<bool> {
    match input.payload {
        Some("confirm_yes") => return Some(true),
        Some("confirm_no") => return Some(false),
        _ => {}
    }
    match input.text.to_lowercase().as_str() {
        "1" | "yes" | "y" => Some(true),
        "2" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Answer a rejected field with its corrective prompt and stay on the step.
pub(crate) async fn reject<S: Storage, N: Notifier>(
    state: &AppState<S, N>,
    phone: &str,
    error: &ChatServiceError,
) -> Result<StepOutcome, ChatServiceError> {
    notify::text(state.notifier.as_ref(), phone, &error.user_message()).await;
    Ok(StepOutcome::Stay)
}

/// Fetch or create the session and align its role with the stored identity.
pub(crate) async fn sync_session<N: Notifier>(
    sessions: &SessionStore<N>,
    phone: &str,
    identity: &Identity,
) -> Result<Session, ChatServiceError> {
    let (role, user_id) = (identity.role(), identity.user_id());
    let session = sessions
        .create_or_touch(phone, role, user_id.clone(), identity.name())
        .await;
    if session.role == role && session.user_id == user_id {
        return Ok(session);
    }
    let name = identity.name().to_owned();
    sessions
        .update(phone, move |s| {
            s.role = role;
            s.user_id = user_id;
            s.name = name;
        })
        .await
}

pub struct FlowRouter<S: Storage, N: Notifier> {
    state: AppState<S, N>,
}

impl<S: Storage, N: Notifier> FlowRouter<S, N> {
    pub fn new(state: AppState<S, N>) -> Self {
        Self { state }
    }

    /// Process one inbound message to completion.
    ///
    /// Replies go out through the notifier. Errors the user cannot fix are
    /// answered with a retry prompt and returned; the session step is left as it was.
    pub async fn route(&self, inbound: &Inbound) -> Result<(), ChatServiceError> {
        let phone = normalize_phone(&inbound.from);
        if phone.is_empty() {
            return Err(ChatServiceError::Validation("missing sender".to_owned()));
        }
        let _turn = self.state.sessions.turn(&phone).await;

        let result = self.route_turn(&phone, inbound).await;
        if let Err(e) = &result {
            error!(phone, kind = e.kind(), error = %e, "message handling failed");
            notify::text(self.state.notifier.as_ref(), &phone, &e.user_message()).await;
        }
        result
    }

    async fn route_turn(&self, phone: &str, inbound: &Inbound) -> Result<(), ChatServiceError> {
        let identity = identity::resolve(self.state.store.as_ref(), phone).await?;
        let session = sync_session(&self.state.sessions, phone, &identity).await?;

        match identity {
            Identity::Unknown => self.run_guided(&session, inbound.input()).await,
            known => self.run_known(&known, &session, inbound).await,
        }
    }

    // ── Unknown senders ──────────────────────────────────────────────────────

    async fn run_guided(
        &self,
        session: &Session,
        first: StepInput<'_>,
    ) -> Result<(), ChatServiceError> {
        let phone = session.phone.as_str();
        let mut current = match &session.context {
            Some(ctx @ (FlowState::Welcome { .. }
            | FlowState::TruckerRegistration { .. }
            | FlowState::ShipperRegistration { .. })) => ctx.clone(),
            _ => FlowState::welcome(),
        };
        let mut input = first;

        for _ in 0..=MAX_HANDOFFS {
            debug!(
                phone,
                flow = current.flow_name(),
                step = current.step_name(),
                "running flow step"
            );
            let outcome = match current {
                FlowState::Welcome { step } => welcome::handle(&self.state, phone, step, input).await?,
                FlowState::TruckerRegistration { step, data } => {
                    trucker_registration::handle(&self.state, phone, step, data, input).await?
                }
                FlowState::ShipperRegistration { step, data } => {
                    shipper_registration::handle(&self.state, phone, step, data, input).await?
                }
                FlowState::MainMenu => StepOutcome::Handoff(FlowState::welcome()),
            };

            match outcome {
                StepOutcome::Stay => return Ok(()),
                StepOutcome::Advance(next) => {
                    self.state.sessions.update_context(phone, Some(next)).await?;
                    return Ok(());
                }
                StepOutcome::Handoff(next) => {
                    self.state
                        .sessions
                        .update_context(phone, Some(next.clone()))
                        .await?;
                    current = next;
                    input = StepInput::EMPTY;
                }
                StepOutcome::Finish => {
                    self.state.sessions.update_context(phone, None).await?;
                    info!(phone, "guided flow finished");
                    return Ok(());
                }
            }
        }
        Err(anyhow::anyhow!("flow hand-off limit reached for {phone}").into())
    }

    // ── Known senders ────────────────────────────────────────────────────────

    async fn run_known(
        &self,
        identity: &Identity,
        session: &Session,
        inbound: &Inbound,
    ) -> Result<(), ChatServiceError> {
        let phone = session.phone.as_str();
        let command = Command::parse(inbound.command_text());
        if command.is_delegated() {
            debug!(phone, command = command.name(), "delegating to command dispatcher");
            let reply = self
                .state
                .dispatcher()
                .execute(identity, phone, command)
                .await?;
            if let Some(text) = reply {
                notify::text(self.state.notifier.as_ref(), phone, &text).await;
            }
            return Ok(());
        }

        match identity {
            Identity::Trucker(trucker) => {
                if session.context == Some(FlowState::MainMenu) {
                    main_menu::handle(&self.state, trucker, inbound.input()).await
                } else {
                    main_menu::enter(&self.state, trucker).await;
                    self.state
                        .sessions
                        .update_context(phone, Some(FlowState::MainMenu))
                        .await?;
                    Ok(())
                }
            }
            Identity::Shipper(shipper) => {
                main_menu::greet_shipper(&self.state, shipper).await;
                if session.context.is_some() {
                    self.state.sessions.update_context(phone, None).await?;
                }
                Ok(())
            }
            Identity::Unknown => Ok(()),
        }
    }
}
