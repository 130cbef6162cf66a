use cargolink_chat::domain::repository::Storage;
use cargolink_chat::error::ChatServiceError;
use cargolink_chat::usecase::booking::Actor;
use cargolink_domain::status::{BookingStatus, LoadStatus, PaymentStatus};
use cargolink_testing::phone::unique_phone;

use crate::helpers::{guided_app, scripted_app, seed_load, seed_shipper, seed_trucker};

const GST: &str = "29ABCDE1234F1Z5";

// ── Book ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_let_exactly_one_of_two_racing_truckers_book() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let a = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let b = seed_trucker(&state, &unique_phone(), "Suresh Babu").await;

    let actions = state.booking_actions();
    let (first, second) = tokio::join!(actions.book(&a, load_id), actions.book(&b, load_id));

    let outcomes = [first, second];
    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = outcomes.iter().find(|r| r.is_err()).unwrap();
    assert!(
        matches!(loser, Err(ChatServiceError::LoadNotAvailable)),
        "expected LoadNotAvailable, got {loser:?}"
    );
    let load = state.store.get_load(load_id).await.unwrap();
    assert_eq!(load.status, LoadStatus::Booked);
}

#[tokio::test]
async fn should_take_five_percent_commission_and_notify_shipper() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;

    let view = state.booking_actions().book(&trucker, load_id).await.unwrap();

    assert_eq!(view.booking.agreed_price, 35000.0);
    assert_eq!(view.booking.commission, 1750.0);
    assert_eq!(view.booking.net_amount, 33250.0);
    assert_eq!(view.booking.status, BookingStatus::Confirmed);
    assert!(
        state
            .notifier
            .templates_to(&shipper.phone)
            .contains(&"delivery_notification_shipper".to_owned())
    );
}

#[tokio::test]
async fn should_reject_second_booking_while_trucker_is_busy() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let first = seed_load(&state, &shipper).await;
    let second = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;

    state.booking_actions().book(&trucker, first).await.unwrap();
    let result = state.booking_actions().book(&trucker, second).await;

    assert!(
        matches!(result, Err(ChatServiceError::TruckerNotAvailable)),
        "expected TruckerNotAvailable, got {result:?}"
    );
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_run_booking_from_confirmation_to_settlement() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let actions = state.booking_actions();

    let booked = actions.book(&trucker, load_id).await.unwrap();
    let id = booked.booking.id;

    let pickup = actions.arrived(&trucker, id).await.unwrap();
    let shared = state
        .notifier
        .template_params(&shipper.phone, "shipper_otp_share_v2")
        .unwrap();
    assert!(shared.contains(&("otp", pickup.code.clone())));

    let picked = actions.confirm_pickup(&trucker, id, &pickup.code).await.unwrap();
    assert_eq!(picked.booking.status, BookingStatus::InTransit);
    assert!(picked.booking.picked_up_at.is_some());

    let delivery = actions.reach_destination(&trucker, id).await.unwrap();
    let delivered = actions
        .confirm_delivery(&trucker, id, &delivery.code)
        .await
        .unwrap();
    assert_eq!(delivered.booking.status, BookingStatus::Delivered);
    assert!(delivered.journey.is_some());

    let load = state.store.get_load(load_id).await.unwrap();
    assert_eq!(load.status, LoadStatus::Completed);
    let released = state.store.get_trucker(trucker.id).await.unwrap();
    assert!(released.available);
    assert_eq!(released.total_trips, trucker.total_trips + 1);

    let settled = actions.complete(id).await.unwrap();
    assert_eq!(settled.status, BookingStatus::Completed);
    assert_eq!(settled.payment_status, PaymentStatus::Completed);
    assert!(settled.completed_at.is_some());
}

#[tokio::test]
async fn should_refuse_code_issued_for_another_booking() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let first_load = seed_load(&state, &shipper).await;
    let second_load = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let actions = state.booking_actions();

    let first = actions.book(&trucker, first_load).await.unwrap().booking.id;
    let first_code = actions.arrived(&trucker, first).await.unwrap().code;
    actions
        .cancel(&Actor::Shipper(shipper.clone()), first)
        .await
        .unwrap();
    let second = actions.book(&trucker, second_load).await.unwrap().booking.id;

    let result = actions.confirm_pickup(&trucker, second, &first_code).await;

    assert!(
        matches!(result, Err(ChatServiceError::OtpWrongBooking)),
        "expected OtpWrongBooking, got {result:?}"
    );
    let booking = state.store.get_booking(second).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert!(booking.picked_up_at.is_none());
    assert_eq!(
        state.store.get_load(second_load).await.unwrap().status,
        LoadStatus::Booked
    );
}

#[tokio::test]
async fn should_keep_pickup_code_when_commit_fails() {
    let state = scripted_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let actions = state.booking_actions();
    let id = actions.book(&trucker, load_id).await.unwrap().booking.id;
    let pickup = actions.arrived(&trucker, id).await.unwrap();

    state.store.fail_transitions(true);
    let result = actions.confirm_pickup(&trucker, id, &pickup.code).await;
    state.store.fail_transitions(false);

    assert!(
        matches!(result, Err(ChatServiceError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    assert_eq!(
        state.store.get_booking(id).await.unwrap().status,
        BookingStatus::Confirmed
    );
    let picked = actions.confirm_pickup(&trucker, id, &pickup.code).await.unwrap();
    assert_eq!(picked.booking.status, BookingStatus::InTransit);
}

#[tokio::test]
async fn should_change_nothing_when_delivery_commit_fails() {
    let state = scripted_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let actions = state.booking_actions();
    let id = actions.book(&trucker, load_id).await.unwrap().booking.id;
    let pickup = actions.arrived(&trucker, id).await.unwrap();
    actions.confirm_pickup(&trucker, id, &pickup.code).await.unwrap();
    let delivery = actions.reach_destination(&trucker, id).await.unwrap();

    state.store.fail_transitions(true);
    let result = actions.confirm_delivery(&trucker, id, &delivery.code).await;
    state.store.fail_transitions(false);

    assert!(
        matches!(result, Err(ChatServiceError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    let booking = state.store.get_booking(id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::InTransit);
    assert!(booking.delivered_at.is_none());
    assert_eq!(
        state.store.get_load(load_id).await.unwrap().status,
        LoadStatus::Booked
    );
    let locked = state.store.get_trucker(trucker.id).await.unwrap();
    assert!(!locked.available);
    assert_eq!(locked.total_trips, trucker.total_trips);

    let delivered = actions
        .confirm_delivery(&trucker, id, &delivery.code)
        .await
        .unwrap();
    assert_eq!(delivered.booking.status, BookingStatus::Delivered);
    assert_eq!(
        state.store.get_load(load_id).await.unwrap().status,
        LoadStatus::Completed
    );
}

#[tokio::test]
async fn should_require_pickup_before_delivery() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let id = state
        .booking_actions()
        .book(&trucker, load_id)
        .await
        .unwrap()
        .booking
        .id;

    let result = state.booking_actions().reach_destination(&trucker, id).await;

    assert!(
        matches!(result, Err(ChatServiceError::NotPickedUp)),
        "expected NotPickedUp, got {result:?}"
    );
}

#[tokio::test]
async fn should_refuse_actions_on_another_truckers_booking() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let owner = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let other = seed_trucker(&state, &unique_phone(), "Suresh Babu").await;
    let id = state
        .booking_actions()
        .book(&owner, load_id)
        .await
        .unwrap()
        .booking
        .id;

    let result = state.booking_actions().arrived(&other, id).await;

    assert!(
        matches!(result, Err(ChatServiceError::NotBookingOwner)),
        "expected NotBookingOwner, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_settle_undelivered_booking() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let id = state
        .booking_actions()
        .book(&trucker, load_id)
        .await
        .unwrap()
        .booking
        .id;

    let result = state.booking_actions().complete(id).await;

    assert!(
        matches!(result, Err(ChatServiceError::NotDelivered)),
        "expected NotDelivered, got {result:?}"
    );
}

// ── Cancel ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reopen_load_when_shipper_cancels() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let id = state
        .booking_actions()
        .book(&trucker, load_id)
        .await
        .unwrap()
        .booking
        .id;

    let view = state
        .booking_actions()
        .cancel(&Actor::Shipper(shipper.clone()), id)
        .await
        .unwrap();

    assert_eq!(view.booking.status, BookingStatus::Cancelled);
    assert_eq!(
        state.store.get_load(load_id).await.unwrap().status,
        LoadStatus::Available
    );
    let released = state.store.get_trucker(trucker.id).await.unwrap();
    assert!(released.available);
    assert_eq!(released.total_trips, trucker.total_trips);
    assert!(
        state
            .notifier
            .templates_to(&trucker.phone)
            .contains(&"booking_cancelled".to_owned())
    );
}

#[tokio::test]
async fn should_refuse_cancel_after_pickup() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let actions = state.booking_actions();
    let id = actions.book(&trucker, load_id).await.unwrap().booking.id;
    let pickup = actions.arrived(&trucker, id).await.unwrap();
    actions.confirm_pickup(&trucker, id, &pickup.code).await.unwrap();

    let result = actions.cancel(&Actor::Trucker(trucker.clone()), id).await;

    assert!(
        matches!(result, Err(ChatServiceError::AlreadyPickedUp)),
        "expected AlreadyPickedUp, got {result:?}"
    );
}

#[tokio::test]
async fn should_apply_only_one_of_racing_pickup_and_cancel() {
    let state = scripted_app();
    let shipper = seed_shipper(&state, &unique_phone(), GST).await;
    let load_id = seed_load(&state, &shipper).await;
    let trucker = seed_trucker(&state, &unique_phone(), "Rajesh Kumar").await;
    let actions = state.booking_actions();
    let id = actions.book(&trucker, load_id).await.unwrap().booking.id;
    let pickup = actions.arrived(&trucker, id).await.unwrap();

    // Both sides read the confirmed booking before either commits.
    state.store.yield_after_read(true);
    let shipper_side = Actor::Shipper(shipper.clone());
    let (picked, cancelled) = tokio::join!(
        actions.confirm_pickup(&trucker, id, &pickup.code),
        actions.cancel(&shipper_side, id),
    );
    state.store.yield_after_read(false);

    assert!(
        picked.is_ok() != cancelled.is_ok(),
        "expected exactly one winner, got pickup {picked:?} and cancel {cancelled:?}"
    );
    let booking = state.store.get_booking(id).await.unwrap();
    let load = state.store.get_load(load_id).await.unwrap();
    let assigned = state.store.get_trucker(trucker.id).await.unwrap();
    match booking.status {
        BookingStatus::InTransit => {
            assert!(
                matches!(cancelled, Err(ChatServiceError::AlreadyPickedUp)),
                "expected AlreadyPickedUp, got {cancelled:?}"
            );
            assert!(booking.cancelled_at.is_none());
            assert_eq!(load.status, LoadStatus::Booked);
            assert!(!assigned.available);
        }
        BookingStatus::Cancelled => {
            assert!(
                matches!(picked, Err(ChatServiceError::BookingCancelled)),
                "expected BookingCancelled, got {picked:?}"
            );
            assert!(booking.picked_up_at.is_none());
            assert_eq!(load.status, LoadStatus::Available);
            assert!(assigned.available);
        }
        other => panic!("unexpected booking status {other:?}"),
    }
}
