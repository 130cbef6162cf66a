use std::sync::Arc;

use chrono::Duration;

use cargolink_chat::domain::repository::Storage;
use cargolink_chat::error::ChatServiceError;
use cargolink_chat::infra::memory::MemoryStore;
use cargolink_chat::usecase::otp::OtpVerifier;
use cargolink_domain::status::OtpPurpose;
use cargolink_testing::phone::unique_phone;

fn verifier() -> OtpVerifier<MemoryStore> {
    OtpVerifier::new(Arc::new(MemoryStore::new()))
}

/// A six-digit code guaranteed to differ from `code`.
fn wrong(code: &str) -> String {
    if code == "000000" { "111111" } else { "000000" }.to_owned()
}

#[tokio::test]
async fn should_verify_once_then_report_already_used() {
    let otp = verifier();
    let phone = unique_phone();
    let issued = otp.issue(&phone, OtpPurpose::Pickup, "BK00001").await.unwrap();

    let reference = otp.verify(&phone, &issued.code, OtpPurpose::Pickup).await;
    assert_eq!(reference.unwrap(), "BK00001");

    let result = otp.verify(&phone, &issued.code, OtpPurpose::Pickup).await;
    assert!(
        matches!(result, Err(ChatServiceError::OtpAlreadyUsed)),
        "expected OtpAlreadyUsed, got {result:?}"
    );
}

#[tokio::test]
async fn should_lock_out_after_three_wrong_codes_even_with_correct_code() {
    let otp = verifier();
    let phone = unique_phone();
    let issued = otp.issue(&phone, OtpPurpose::Pickup, "BK00001").await.unwrap();
    let bad = wrong(&issued.code);

    for _ in 0..3 {
        let result = otp.verify(&phone, &bad, OtpPurpose::Pickup).await;
        assert!(
            matches!(result, Err(ChatServiceError::OtpMismatch)),
            "expected OtpMismatch, got {result:?}"
        );
    }

    let result = otp.verify(&phone, &issued.code, OtpPurpose::Pickup).await;
    assert!(
        matches!(result, Err(ChatServiceError::OtpTooManyAttempts)),
        "expected OtpTooManyAttempts, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_expired_code() {
    let otp = OtpVerifier::with_ttl(Arc::new(MemoryStore::new()), Duration::milliseconds(50));
    let phone = unique_phone();
    let issued = otp.issue(&phone, OtpPurpose::Delivery, "BK00002").await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(90)).await;

    let result = otp.verify(&phone, &issued.code, OtpPurpose::Delivery).await;
    assert!(
        matches!(result, Err(ChatServiceError::OtpExpired)),
        "expected OtpExpired, got {result:?}"
    );
}

#[tokio::test]
async fn should_revoke_earlier_code_on_reissue() {
    let otp = verifier();
    let phone = unique_phone();
    let first = otp.issue(&phone, OtpPurpose::Pickup, "BK00001").await.unwrap();
    let second = otp.issue(&phone, OtpPurpose::Pickup, "BK00001").await.unwrap();

    let active = otp
        .store
        .find_active_otp(&phone, OtpPurpose::Pickup)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, second.id);

    if first.code != second.code {
        let result = otp.verify(&phone, &first.code, OtpPurpose::Pickup).await;
        assert!(
            matches!(result, Err(ChatServiceError::OtpExpired)),
            "expected OtpExpired, got {result:?}"
        );
    }
    assert!(otp.verify(&phone, &second.code, OtpPurpose::Pickup).await.is_ok());
}

#[tokio::test]
async fn should_keep_purposes_apart() {
    let otp = verifier();
    let phone = unique_phone();
    let pickup = otp.issue(&phone, OtpPurpose::Pickup, "BK00001").await.unwrap();

    let result = otp.verify(&phone, &pickup.code, OtpPurpose::Delivery).await;
    assert!(
        matches!(result, Err(ChatServiceError::OtpNotFound)),
        "expected OtpNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_not_found_without_any_code() {
    let otp = verifier();
    let result = otp.verify(&unique_phone(), "123456", OtpPurpose::Pickup).await;
    assert!(
        matches!(result, Err(ChatServiceError::OtpNotFound)),
        "expected OtpNotFound, got {result:?}"
    );
}
