use axum::{Json, extract::State};
use serde::Serialize;

use crate::domain::repository::{Notifier, Storage};
use crate::session::{Session, SessionStats};
use crate::state::AppState;

// ── GET /sessions/stats ──────────────────────────────────────────────────────

pub async fn get_stats<S: Storage, N: Notifier>(
    State(state): State<AppState<S, N>>,
) -> Json<SessionStats> {
    Json(state.sessions.stats().await)
}

// ── GET /sessions ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionsResponse {
    pub count: usize,
    pub sessions: Vec<Session>,
}

pub async fn list_sessions<S: Storage, N: Notifier>(
    State(state): State<AppState<S, N>>,
) -> Json<SessionsResponse> {
    let sessions = state.sessions.active_sessions().await;
    Json(SessionsResponse {
        count: sessions.len(),
        sessions,
    })
}
