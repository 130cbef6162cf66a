use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use cargolink_chat::router::build_router;
use cargolink_testing::phone::unique_phone;
use cargolink_testing::webhook::{TestMessage, WebhookForm};

use crate::helpers::{TestState, guided_app, legacy_app, seed_load, seed_shipper, seed_trucker};

fn server(state: &TestState) -> TestServer {
    TestServer::new(build_router(state.clone())).unwrap()
}

#[tokio::test]
async fn should_answer_health_probes_with_request_id() {
    let server = server(&guided_app());

    let response = server.get("/healthz").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(server.get("/readyz").await.status_code(), StatusCode::OK);
}

// ── Webhook ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_acknowledge_webhook_and_start_welcome() {
    let state = guided_app();
    let server = server(&state);
    let phone = unique_phone();

    let response = server
        .post("/whatsapp/webhook")
        .form(&WebhookForm::text(&phone, "hi"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        state.notifier.templates_to(&phone),
        vec!["new_user_welcome".to_owned()]
    );
}

#[tokio::test]
async fn should_acknowledge_webhook_even_when_sender_is_missing() {
    let server = server(&legacy_app());

    let response = server
        .post("/whatsapp/webhook")
        .form(&WebhookForm::text("", "STATUS"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn should_return_legacy_reply_from_test_endpoint() {
    let state = legacy_app();
    let server = server(&state);
    let phone = unique_phone();

    let response = server
        .post("/whatsapp/test")
        .json(&TestMessage::text(&phone, "HELP"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["mode"], "legacy");
    let reply = body["reply"].as_str().unwrap();
    assert!(reply.contains("REGISTER"), "unexpected reply: {reply}");
    assert_eq!(state.notifier.last_text_to(&phone).as_deref(), Some(reply));
}

// ── Monitoring ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_session_stats_and_list() {
    let state = guided_app();
    let server = server(&state);
    server
        .post("/whatsapp/test")
        .json(&TestMessage::text(&unique_phone(), "hi"))
        .await;

    let stats: Value = server.get("/sessions/stats").await.json();
    assert_eq!(stats["active_count"], 1);

    let list: Value = server.get("/sessions").await.json();
    assert_eq!(list["count"], 1);
    assert_eq!(list["sessions"].as_array().unwrap().len(), 1);
}

// ── REST ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_and_fetch_loads() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), "29ABCDE1234F1Z5").await;
    let load_id = seed_load(&state, &shipper).await;
    let server = server(&state);

    let loads: Value = server.get("/api/loads").await.json();
    assert_eq!(loads.as_array().unwrap().len(), 1);

    let response = server.get(&format!("/api/loads/{load_id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let load: Value = response.json();
    assert_eq!(load["from_city"], "Chennai");

    let found: Value = server
        .post("/api/loads/search")
        .json(&serde_json::json!({ "from_city": "chennai" }))
        .await
        .json();
    assert_eq!(found.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn should_return_not_found_kind_for_missing_booking() {
    let server = server(&guided_app());

    let response = server.get("/api/bookings/BK00042").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["kind"], "BOOKING_NOT_FOUND");
}

#[tokio::test]
async fn should_refuse_to_complete_undelivered_booking() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), "29ABCDE1234F1Z5").await;
    let load_id = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let view = state.booking_actions().book(&trucker, load_id).await.unwrap();
    let server = server(&state);

    let booking: Value = server
        .get(&format!("/api/bookings/{}", view.booking.id))
        .await
        .json();
    assert_eq!(booking["load"]["id"], load_id.to_string());

    let response = server
        .post(&format!("/api/bookings/{}/complete", view.booking.id))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["kind"], "NOT_DELIVERED");
}

#[tokio::test]
async fn should_fetch_trucker_profile() {
    let state = guided_app();
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let server = server(&state);

    let body: Value = server
        .get(&format!("/api/truckers/{}", trucker.id))
        .await
        .json();

    assert_eq!(body["name"], "Rajesh Kumar");
}
