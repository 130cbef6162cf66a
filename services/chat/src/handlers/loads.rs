use axum::{
    Json,
    extract::{Path, State},
};

use cargolink_domain::id::LoadId;

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::{Load, LoadSearch};
use crate::error::ChatServiceError;
use crate::state::AppState;

// ── GET /api/loads ───────────────────────────────────────────────────────────

/// Every load currently open for booking.
pub async fn list_loads<S: Storage, N: Notifier>(
    State(state): State<AppState<S, N>>,
) -> Result<Json<Vec<Load>>, ChatServiceError> {
    let loads = state.load_queries().search(&LoadSearch::default()).await?;
    Ok(Json(loads))
}

// ── POST /api/loads/search ───────────────────────────────────────────────────

pub async fn search_loads<S: Storage, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Json(search): Json<LoadSearch>,
) -> Result<Json<Vec<Load>>, ChatServiceError> {
    let loads = state.load_queries().search(&search).await?;
    Ok(Json(loads))
}

// ── GET /api/loads/{id} ──────────────────────────────────────────────────────

pub async fn get_load<S: Storage, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Path(id): Path<LoadId>,
) -> Result<Json<Load>, ChatServiceError> {
    Ok(Json(state.store.get_load(id).await?))
}
