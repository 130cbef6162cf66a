use std::sync::Arc;

use chrono::Duration;
use futures::future::join_all;

use cargolink_chat::error::ChatServiceError;
use cargolink_chat::session::{FlowState, SessionStore};
use cargolink_domain::role::UserRole;
use cargolink_testing::phone::unique_phone;

use crate::helpers::RecordingNotifier;

fn store_with_ttl(ttl: Duration) -> (Arc<SessionStore<RecordingNotifier>>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Arc::new(SessionStore::with_ttl(Arc::clone(&notifier), ttl));
    (store, notifier)
}

async fn wait_past(ttl: Duration) {
    let wait = (ttl + Duration::milliseconds(40)).to_std().unwrap();
    tokio::time::sleep(wait).await;
}

// ── create_or_touch ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_one_session_for_concurrent_first_messages() {
    let (store, _) = store_with_ttl(Duration::minutes(30));
    let phone = unique_phone();

    let sessions = join_all(
        (0..16).map(|_| store.create_or_touch(&phone, UserRole::Unknown, None, "")),
    )
    .await;

    let first = sessions[0].id;
    assert!(sessions.iter().all(|s| s.id == first));
    assert_eq!(store.stats().await.active_count, 1);
}

#[tokio::test]
async fn should_refresh_expiry_on_touch() {
    let (store, _) = store_with_ttl(Duration::minutes(30));
    let phone = unique_phone();

    let created = store.create_or_touch(&phone, UserRole::Unknown, None, "").await;
    let touched = store.create_or_touch(&phone, UserRole::Trucker, None, "").await;

    assert_eq!(created.id, touched.id);
    assert!(touched.expires_at >= created.expires_at);
    // The role is only set on creation; identity changes go through update.
    assert_eq!(touched.role, UserRole::Unknown);
}

// ── Expiry ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_treat_expired_session_as_absent_before_sweep() {
    let ttl = Duration::milliseconds(60);
    let (store, _) = store_with_ttl(ttl);
    let phone = unique_phone();
    store.create_or_touch(&phone, UserRole::Unknown, None, "").await;

    wait_past(ttl).await;

    let result = store.get(&phone).await;
    assert!(
        matches!(result, Err(ChatServiceError::SessionNotFound)),
        "expected SessionNotFound, got {result:?}"
    );
    let result = store.update_context(&phone, Some(FlowState::welcome())).await;
    assert!(
        matches!(result, Err(ChatServiceError::SessionNotFound)),
        "expected SessionNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_replace_expired_session_and_notify_once() {
    let ttl = Duration::milliseconds(60);
    let (store, notifier) = store_with_ttl(ttl);
    let phone = unique_phone();
    let old = store
        .create_or_touch(&phone, UserRole::Trucker, Some("TRK00001".to_owned()), "Rajesh")
        .await;

    wait_past(ttl).await;
    let new = store.create_or_touch(&phone, UserRole::Trucker, None, "").await;

    assert_ne!(old.id, new.id);
    assert_eq!(notifier.templates_to(&phone), vec!["session_expired".to_owned()]);
    let params = notifier.template_params(&phone, "session_expired").unwrap();
    assert!(params.contains(&("name", "Rajesh".to_owned())));
}

#[tokio::test]
async fn should_sweep_expired_sessions_once() {
    let ttl = Duration::milliseconds(60);
    let (store, notifier) = store_with_ttl(ttl);
    let (a, b) = (unique_phone(), unique_phone());
    store.create_or_touch(&a, UserRole::Unknown, None, "").await;
    store.create_or_touch(&b, UserRole::Unknown, None, "").await;

    wait_past(ttl).await;

    assert_eq!(store.sweep().await, 2);
    assert_eq!(store.sweep().await, 0);
    assert_eq!(notifier.templates_to(&a).len(), 1);
    assert_eq!(notifier.templates_to(&b).len(), 1);
}

#[tokio::test]
async fn should_fall_back_to_text_expiry_notice() {
    let ttl = Duration::milliseconds(60);
    let (store, notifier) = store_with_ttl(ttl);
    notifier.fail_templates(true);
    let phone = unique_phone();
    store.create_or_touch(&phone, UserRole::Unknown, None, "").await;

    wait_past(ttl).await;
    store.sweep().await;

    assert_eq!(notifier.texts_to(&phone).len(), 1);
}

// ── Context and monitoring ───────────────────────────────────────────────────

#[tokio::test]
async fn should_store_and_clear_flow_context() {
    let (store, _) = store_with_ttl(Duration::minutes(30));
    let phone = unique_phone();
    store.create_or_touch(&phone, UserRole::Unknown, None, "").await;

    store
        .update_context(&phone, Some(FlowState::trucker_registration()))
        .await
        .unwrap();
    assert_eq!(
        store.get(&phone).await.unwrap().context,
        Some(FlowState::trucker_registration())
    );

    store.update_context(&phone, None).await.unwrap();
    assert_eq!(store.get(&phone).await.unwrap().context, None);
}

#[tokio::test]
async fn should_extend_expiry() {
    let (store, _) = store_with_ttl(Duration::minutes(30));
    let phone = unique_phone();
    let created = store.create_or_touch(&phone, UserRole::Unknown, None, "").await;

    let extended = store.extend(&phone, 15).await.unwrap();

    assert_eq!(extended.expires_at, created.expires_at + Duration::minutes(15));
}

#[tokio::test]
async fn should_count_live_sessions_by_role() {
    let (store, _) = store_with_ttl(Duration::minutes(30));
    store.create_or_touch(&unique_phone(), UserRole::Trucker, None, "").await;
    store.create_or_touch(&unique_phone(), UserRole::Trucker, None, "").await;
    store.create_or_touch(&unique_phone(), UserRole::Shipper, None, "").await;

    let stats = store.stats().await;

    assert_eq!(stats.active_count, 3);
    assert_eq!(stats.by_role.get(&UserRole::Trucker), Some(&2));
    assert_eq!(stats.by_role.get(&UserRole::Shipper), Some(&1));
    assert_eq!(store.active_sessions().await.len(), 3);
}

#[tokio::test]
async fn should_end_session_with_notice() {
    let (store, notifier) = store_with_ttl(Duration::minutes(30));
    let phone = unique_phone();
    store.create_or_touch(&phone, UserRole::Unknown, None, "").await;

    store.end(&phone).await.unwrap();

    assert!(store.get(&phone).await.is_err());
    assert_eq!(notifier.templates_to(&phone), vec!["session_expired".to_owned()]);
    let result = store.end(&phone).await;
    assert!(
        matches!(result, Err(ChatServiceError::SessionNotFound)),
        "expected SessionNotFound, got {result:?}"
    );
}
