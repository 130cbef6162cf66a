use cargolink_chat::domain::repository::Storage;
use cargolink_chat::legacy::Reply;
use cargolink_domain::id::{BookingId, LoadId};
use cargolink_domain::status::{BookingStatus, LoadStatus, OtpPurpose};
use cargolink_testing::phone::{unique_phone, whatsapp_address};

use crate::helpers::{TestState, issued_code, legacy_app, seed_load, seed_shipper, seed_trucker};

async fn send(state: &TestState, phone: &str, text: &str) -> Reply {
    state
        .dispatcher()
        .dispatch(&whatsapp_address(phone), text)
        .await
        .unwrap()
}

async fn reply(state: &TestState, phone: &str, text: &str) -> String {
    send(state, phone, text)
        .await
        .unwrap_or_else(|| panic!("no text reply to {text:?}"))
}

// ── Registration ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_trucker_from_one_message() {
    let state = legacy_app();
    state.notifier.fail_templates(true);
    let phone = unique_phone();

    let text = reply(&state, &phone, "REGISTER Rajesh Kumar, tn01ab1234, 32ft, 25").await;

    assert!(text.contains("TRK00001"), "unexpected reply: {text}");
    assert!(text.contains("TN01AB1234"), "unexpected reply: {text}");
    let trucker = state.store.get_trucker_by_phone(&phone).await.unwrap().unwrap();
    assert_eq!(trucker.capacity, 25.0);
    assert_eq!(trucker.vehicle_type, "32ft");
}

#[tokio::test]
async fn should_answer_with_nothing_when_template_is_delivered() {
    let state = legacy_app();
    let phone = unique_phone();

    let reply = send(&state, &phone, "REGISTER Rajesh Kumar, TN01AB1234, 32ft, 25").await;

    assert_eq!(reply, None);
    assert!(
        state
            .notifier
            .templates_to(&phone)
            .contains(&"registration_success".to_owned())
    );
}

#[tokio::test]
async fn should_explain_format_for_incomplete_registration() {
    let state = legacy_app();
    let phone = unique_phone();

    let text = reply(&state, &phone, "REGISTER Rajesh Kumar, TN01AB1234").await;

    assert!(text.contains("Invalid format"));
    assert!(state.store.get_trucker_by_phone(&phone).await.unwrap().is_none());
}

#[tokio::test]
async fn should_reject_duplicate_vehicle_in_chat() {
    let state = legacy_app();
    send(&state, &unique_phone(), "REGISTER Rajesh Kumar, TN01AB1234, 32ft, 25").await;

    let text = reply(&state, &unique_phone(), "REGISTER Suresh Babu, TN01AB1234, 20ft, 10").await;

    assert!(text.contains("vehicle is already registered"), "unexpected reply: {text}");
}

#[tokio::test]
async fn should_register_shipper_and_refuse_cross_role() {
    let state = legacy_app();
    state.notifier.fail_templates(true);
    let phone = unique_phone();

    let text = reply(&state, &phone, "register shipper ABC Logistics, 29abcde1234f1z5").await;
    assert!(text.contains("SH00001"), "unexpected reply: {text}");
    assert!(text.contains("Karnataka"), "unexpected reply: {text}");

    let text = reply(&state, &phone, "REGISTER Rajesh Kumar, TN01AB1234, 32ft, 25").await;
    assert!(text.contains("registered as a shipper"), "unexpected reply: {text}");
}

// ── Rejections ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_unknown_input_with_help_hint() {
    let state = legacy_app();

    let text = reply(&state, &unique_phone(), "where is my truck").await;

    assert_eq!(
        text,
        "❌ Invalid command: 'where is my truck'\n\nType HELP to see all available commands."
    );
}

#[tokio::test]
async fn should_ask_unregistered_sender_to_register() {
    let state = legacy_app();

    let text = reply(&state, &unique_phone(), "STATUS").await;

    assert!(text.contains("register first"), "unexpected reply: {text}");
}

#[tokio::test]
async fn should_show_usage_for_post_without_details() {
    let state = legacy_app();
    let phone = unique_phone();
    seed_shipper(&state, &phone, "29ABCDE1234F1Z5").await;

    let text = reply(&state, &phone, "POST").await;
    assert!(text.contains("POST <From> <To> <Material> <Weight> <Price>"));

    let text = reply(&state, &phone, "POST Chennai Bangalore").await;
    assert!(text.contains("Incomplete details"));
}

// ── Trip lifecycle ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_run_full_trip_through_commands() {
    let state = legacy_app();
    state.notifier.fail_templates(true);
    let shipper_phone = unique_phone();
    let trucker_phone = unique_phone();
    seed_shipper(&state, &shipper_phone, "29ABCDE1234F1Z5").await;
    seed_trucker(&state, &trucker_phone, "Rajesh Kumar").await;

    let posted = reply(&state, &shipper_phone, "POST chennai bangalore steel rods 20 ₹45,000").await;
    assert!(posted.contains("LD00001"), "unexpected reply: {posted}");

    let listing = reply(&state, &trucker_phone, "LOAD chennai").await;
    assert!(listing.contains("LD00001"), "unexpected reply: {listing}");
    assert!(listing.contains("Steel Rods"), "unexpected reply: {listing}");

    let booked = reply(&state, &trucker_phone, "BOOK ld00001").await;
    assert!(booked.contains("BK00001"), "unexpected reply: {booked}");
    assert!(booked.contains("₹42750"), "unexpected reply: {booked}");

    let arrived = reply(&state, &trucker_phone, "ARRIVED BK00001").await;
    assert!(arrived.contains("PICKUP BK00001"), "unexpected reply: {arrived}");
    let code = issued_code(&state, &trucker_phone, OtpPurpose::Pickup).await;
    assert!(
        state
            .notifier
            .texts_to(&shipper_phone)
            .iter()
            .any(|t| t.contains(&code))
    );

    let picked = reply(&state, &trucker_phone, &format!("PICKUP BK00001 {code}")).await;
    assert!(picked.contains("DELIVER BK00001"), "unexpected reply: {picked}");

    let at_destination = reply(&state, &trucker_phone, "DELIVER BK00001").await;
    assert!(at_destination.contains("Reached Destination"), "unexpected reply: {at_destination}");
    let code = issued_code(&state, &trucker_phone, OtpPurpose::Delivery).await;

    let delivered = reply(&state, &trucker_phone, &format!("DELIVER BK00001 {code}")).await;
    assert!(delivered.contains("Delivery Confirmed"), "unexpected reply: {delivered}");

    let booking = state.store.get_booking(BookingId(1)).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Delivered);
    let load = state.store.get_load(LoadId(1)).await.unwrap();
    assert_eq!(load.status, LoadStatus::Completed);

    let status = reply(&state, &trucker_phone, "S").await;
    assert!(status.contains("No active bookings"), "unexpected reply: {status}");

    let tracking = reply(&state, &shipper_phone, "TRACK BK00001").await;
    assert!(tracking.contains("Delivered"), "unexpected reply: {tracking}");
}

#[tokio::test]
async fn should_point_to_new_code_after_too_many_attempts() {
    let state = legacy_app();
    let shipper_phone = unique_phone();
    let trucker_phone = unique_phone();
    let shipper = seed_shipper(&state, &shipper_phone, "29ABCDE1234F1Z5").await;
    seed_trucker(&state, &trucker_phone, "Rajesh Kumar").await;
    seed_load(&state, &shipper).await;
    send(&state, &trucker_phone, "BOOK LD00001").await;
    send(&state, &trucker_phone, "ARRIVED BK00001").await;
    let code = issued_code(&state, &trucker_phone, OtpPurpose::Pickup).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for _ in 0..3 {
        let text = reply(&state, &trucker_phone, &format!("PICKUP BK00001 {wrong}")).await;
        assert!(text.contains("Invalid OTP"), "unexpected reply: {text}");
    }
    let text = reply(&state, &trucker_phone, &format!("PICKUP BK00001 {code}")).await;

    assert!(text.contains("Too many wrong attempts"), "unexpected reply: {text}");
    assert!(text.contains("Type ARRIVED BK00001"), "unexpected reply: {text}");
}

#[tokio::test]
async fn should_quote_penalty_when_trucker_cancels() {
    let state = legacy_app();
    let shipper = seed_shipper(&state, &unique_phone(), "29ABCDE1234F1Z5").await;
    let trucker_phone = unique_phone();
    seed_trucker(&state, &trucker_phone, "Rajesh Kumar").await;
    seed_load(&state, &shipper).await;
    send(&state, &trucker_phone, "BOOK LD00001").await;

    let text = reply(&state, &trucker_phone, "CANCEL BK00001").await;

    assert!(text.contains("Booking Cancelled"), "unexpected reply: {text}");
    assert!(text.contains("₹500"), "unexpected reply: {text}");
    assert_eq!(
        state.store.get_load(LoadId(1)).await.unwrap().status,
        LoadStatus::Available
    );
}

#[tokio::test]
async fn should_list_shipper_loads_newest_first() {
    let state = legacy_app();
    state.notifier.fail_templates(true);
    let phone = unique_phone();
    seed_shipper(&state, &phone, "29ABCDE1234F1Z5").await;
    send(&state, &phone, "POST Chennai Bangalore Electronics 15 35000").await;
    send(&state, &phone, "POST Mumbai Pune Cement 20 18000").await;

    let text = reply(&state, &phone, "my loads").await;

    let newer = text.find("LD00002").unwrap();
    let older = text.find("LD00001").unwrap();
    assert!(newer < older, "unexpected order: {text}");
}

#[tokio::test]
async fn should_open_support_ticket() {
    let state = legacy_app();

    let text = reply(&state, &unique_phone(), "SUPPORT payment not received").await;

    assert!(text.contains("TK00001"), "unexpected reply: {text}");
}
