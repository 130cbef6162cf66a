use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use cargolink_domain::id::BookingId;

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::{Booking, Load};
use crate::error::ChatServiceError;
use crate::state::AppState;

// ── GET /api/bookings/{id} ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct BookingResponse {
    #[serde(flatten)]
    pub booking: Booking,
    pub load: Load,
}

pub async fn get_booking<S: Storage, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Path(id): Path<BookingId>,
) -> Result<Json<BookingResponse>, ChatServiceError> {
    let booking = state.store.get_booking(id).await?;
    let load = state.store.get_load(booking.load_id).await?;
    Ok(Json(BookingResponse { booking, load }))
}

// ── POST /api/bookings/{id}/complete ─────────────────────────────────────────

/// Settle a delivered booking once payment has been released.
pub async fn complete_booking<S: Storage, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, ChatServiceError> {
    let booking = state.booking_actions().complete(id).await?;
    Ok(Json(booking))
}
