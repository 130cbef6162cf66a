use axum::{
    Json,
    extract::{Path, State},
};

use cargolink_domain::id::TruckerId;

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::Trucker;
use crate::error::ChatServiceError;
use crate::state::AppState;

// ── GET /api/truckers/{id} ───────────────────────────────────────────────────

pub async fn get_trucker<S: Storage, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Path(id): Path<TruckerId>,
) -> Result<Json<Trucker>, ChatServiceError> {
    Ok(Json(state.store.get_trucker(id).await?))
}
