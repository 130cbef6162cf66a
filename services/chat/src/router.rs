use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use cargolink_core::health::{healthz, readyz};
use cargolink_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::domain::repository::{Notifier, Storage};
use crate::handlers::{
    bookings::{complete_booking, get_booking},
    loads::{get_load, list_loads, search_loads},
    sessions::{get_stats, list_sessions},
    truckers::get_trucker,
    webhook::{receive_message, test_message},
};
use crate::state::AppState;

pub fn build_router<S: Storage, N: Notifier>(state: AppState<S, N>) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Messaging
        .route("/whatsapp/webhook", post(receive_message::<S, N>))
        .route("/whatsapp/test", post(test_message::<S, N>))
        // Sessions
        .route("/sessions", get(list_sessions::<S, N>))
        .route("/sessions/stats", get(get_stats::<S, N>))
        // Loads
        .route("/api/loads", get(list_loads::<S, N>))
        .route("/api/loads/search", post(search_loads::<S, N>))
        .route("/api/loads/{id}", get(get_load::<S, N>))
        // Truckers
        .route("/api/truckers/{id}", get(get_trucker::<S, N>))
        // Bookings
        .route("/api/bookings/{id}", get(get_booking::<S, N>))
        .route("/api/bookings/{id}/complete", post(complete_booking::<S, N>))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
