use axum::{Form, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use cargolink_domain::phone::normalize_phone;

use crate::domain::repository::{Notifier, Storage};
use crate::error::ChatServiceError;
use crate::flow::Inbound;
use crate::state::{AppState, InteractionMode};
use crate::usecase::notify;

/// Run one inbound message through the configured interaction mode.
///
/// In legacy mode the dispatcher's reply is sent and also returned; guided
/// replies go out from inside the flows.
async fn process<S: Storage, N: Notifier>(
    state: &AppState<S, N>,
    inbound: &Inbound,
) -> Result<Option<String>, ChatServiceError> {
    match state.mode {
        InteractionMode::Guided => {
            state.flow_router().route(inbound).await?;
            Ok(None)
        }
        InteractionMode::Legacy => {
            let phone = normalize_phone(&inbound.from);
            match state
                .dispatcher()
                .dispatch(&inbound.from, inbound.command_text())
                .await
            {
                Ok(reply) => {
                    if let Some(body) = &reply {
                        notify::text(state.notifier.as_ref(), &phone, body).await;
                    }
                    Ok(reply)
                }
                Err(e) => {
                    error!(phone, kind = e.kind(), error = %e, "command handling failed");
                    if !phone.is_empty() {
                        notify::text(state.notifier.as_ref(), &phone, &e.user_message()).await;
                    }
                    Err(e)
                }
            }
        }
    }
}

// ── POST /whatsapp/webhook ───────────────────────────────────────────────────

/// Inbound message as posted by the provider.
#[derive(Debug, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "ButtonPayload", default)]
    pub button_payload: Option<String>,
    #[serde(rename = "ListReplyId", default)]
    pub list_reply_id: Option<String>,
}

impl From<WebhookForm> for Inbound {
    fn from(form: WebhookForm) -> Self {
        let payload = form
            .button_payload
            .filter(|p| !p.trim().is_empty())
            .or(form.list_reply_id);
        Self {
            from: form.from,
            body: form.body,
            button_payload: payload,
        }
    }
}

/// Always 200 once the message is processed: the provider would otherwise retry
/// a message whose reply already went out.
pub async fn receive_message<S: Storage, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Form(form): Form<WebhookForm>,
) -> StatusCode {
    let inbound = Inbound::from(form);
    info!(
        from = %inbound.from,
        has_payload = inbound.button_payload.is_some(),
        mode = state.mode.as_str(),
        "inbound message"
    );
    // Failures are already logged and answered in chat.
    let _ = process(&state, &inbound).await;
    StatusCode::OK
}

// ── POST /whatsapp/test ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TestResponse {
    pub success: bool,
    pub mode: InteractionMode,
    pub reply: Option<String>,
}

pub async fn test_message<S: Storage, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Json(inbound): Json<Inbound>,
) -> Json<TestResponse> {
    let (success, reply) = match process(&state, &inbound).await {
        Ok(reply) => (true, reply),
        Err(e) => (false, Some(e.user_message())),
    };
    Json(TestResponse {
        success,
        mode: state.mode,
        reply,
    })
}
