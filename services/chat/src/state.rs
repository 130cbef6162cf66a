use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;

use crate::domain::repository::{Notifier, Storage};
use crate::flow::FlowRouter;
use crate::jobs::deferred::{self, DeferredQueue, DeferredWorker};
use crate::legacy::CommandDispatcher;
use crate::session::SessionStore;
use crate::usecase::booking::BookingActions;
use crate::usecase::load::{LoadQueries, PostLoadUseCase};
use crate::usecase::otp::OtpVerifier;
use crate::usecase::registration::Registration;
use crate::usecase::support::OpenTicketUseCase;

/// How inbound messages are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Button-driven dialogues with per-phone session state.
    Guided,
    /// Stateless keyword commands.
    Legacy,
}

impl InteractionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guided => "guided",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guided" => Ok(Self::Guided),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!("unknown interaction mode: {other}")),
        }
    }
}

/// Shared application state passed to every handler via axum `State`.
pub struct AppState<S: Storage, N: Notifier> {
    pub store: Arc<S>,
    pub notifier: Arc<N>,
    pub sessions: Arc<SessionStore<N>>,
    pub otp: Arc<OtpVerifier<S>>,
    pub deferred: DeferredQueue,
    pub mode: InteractionMode,
}

impl<S: Storage, N: Notifier> Clone for AppState<S, N> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            sessions: Arc::clone(&self.sessions),
            otp: Arc::clone(&self.otp),
            deferred: self.deferred.clone(),
            mode: self.mode,
        }
    }
}

impl<S: Storage, N: Notifier> AppState<S, N> {
    /// Wire every collaborator once. The returned worker must be spawned for
    /// deferred messages to go out.
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        session_ttl: Duration,
        mode: InteractionMode,
    ) -> (Self, DeferredWorker<N>) {
        let (deferred, worker) = deferred::channel(Arc::clone(&notifier));
        let state = Self {
            sessions: Arc::new(SessionStore::with_ttl(Arc::clone(&notifier), session_ttl)),
            otp: Arc::new(OtpVerifier::new(Arc::clone(&store))),
            store,
            notifier,
            deferred,
            mode,
        };
        (state, worker)
    }

    // ── Use cases ────────────────────────────────────────────────────────────

    pub fn registration(&self) -> Registration<S> {
        Registration {
            store: Arc::clone(&self.store),
        }
    }

    pub fn booking_actions(&self) -> BookingActions<S, N> {
        BookingActions {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            otp: Arc::clone(&self.otp),
            deferred: self.deferred.clone(),
        }
    }

    pub fn post_load(&self) -> PostLoadUseCase<S> {
        PostLoadUseCase {
            store: Arc::clone(&self.store),
            deferred: self.deferred.clone(),
        }
    }

    pub fn load_queries(&self) -> LoadQueries<S> {
        LoadQueries {
            store: Arc::clone(&self.store),
        }
    }

    pub fn open_ticket(&self) -> OpenTicketUseCase<S> {
        OpenTicketUseCase {
            store: Arc::clone(&self.store),
        }
    }

    // ── Entry points ─────────────────────────────────────────────────────────

    pub fn flow_router(&self) -> FlowRouter<S, N> {
        FlowRouter::new(self.clone())
    }

    pub fn dispatcher(&self) -> CommandDispatcher<S, N> {
        CommandDispatcher::new(self.clone())
    }
}
