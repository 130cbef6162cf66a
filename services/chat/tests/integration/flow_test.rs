use cargolink_chat::domain::repository::Storage;
use cargolink_chat::flow::Inbound;
use cargolink_chat::session::FlowState;
use cargolink_chat::session::context::{TruckerRegistrationData, TruckerStep, WelcomeStep};
use cargolink_chat::state::InteractionMode;
use cargolink_domain::role::UserRole;
use cargolink_testing::phone::{unique_phone, whatsapp_address};

use crate::helpers::{TestState, guided_app, seed_shipper, seed_trucker, test_app};

async fn say(state: &TestState, phone: &str, text: &str) {
    state
        .flow_router()
        .route(&Inbound::text(&whatsapp_address(phone), text))
        .await
        .unwrap();
}

async fn tap(state: &TestState, phone: &str, payload: &str) {
    state
        .flow_router()
        .route(&Inbound::button(&whatsapp_address(phone), payload))
        .await
        .unwrap();
}

async fn context(state: &TestState, phone: &str) -> Option<FlowState> {
    state.sessions.get(phone).await.unwrap().context
}

async fn register_trucker_up_to_confirmation(state: &TestState, phone: &str) {
    say(state, phone, "hi").await;
    tap(state, phone, "role_trucker").await;
    say(state, phone, "Rajesh Kumar").await;
    say(state, phone, "tn01ab1234").await;
    say(state, phone, "3").await;
    say(state, phone, "25").await;
}

// ── Welcome ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_greet_unknown_sender_and_await_role() {
    let state = guided_app();
    let phone = unique_phone();

    say(&state, &phone, "hello").await;

    assert_eq!(
        state.notifier.templates_to(&phone),
        vec!["new_user_welcome".to_owned()]
    );
    assert_eq!(
        context(&state, &phone).await,
        Some(FlowState::Welcome {
            step: WelcomeStep::RoleSelection
        })
    );
}

#[tokio::test]
async fn should_stay_in_role_selection_for_learn_more() {
    let state = guided_app();
    let phone = unique_phone();
    say(&state, &phone, "hi").await;

    tap(&state, &phone, "learn_more").await;

    assert!(state.notifier.last_text_to(&phone).unwrap().contains("CargoLink"));
    assert_eq!(
        context(&state, &phone).await,
        Some(FlowState::Welcome {
            step: WelcomeStep::RoleSelection
        })
    );
}

#[tokio::test]
async fn should_hand_off_to_registration_in_the_same_turn() {
    let state = guided_app();
    let phone = unique_phone();
    say(&state, &phone, "hi").await;

    say(&state, &phone, "I drive a truck").await;

    assert!(
        state
            .notifier
            .templates_to(&phone)
            .contains(&"trucker_registration_name".to_owned())
    );
    assert_eq!(
        context(&state, &phone).await,
        Some(FlowState::TruckerRegistration {
            step: TruckerStep::ValidateName,
            data: TruckerRegistrationData::default(),
        })
    );
}

// ── Trucker registration ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_trucker_end_to_end() {
    let state = guided_app();
    let phone = unique_phone();

    register_trucker_up_to_confirmation(&state, &phone).await;
    say(&state, &phone, "YES").await;

    let trucker = state.store.get_trucker_by_phone(&phone).await.unwrap().unwrap();
    assert_eq!(trucker.name, "Rajesh Kumar");
    assert_eq!(trucker.vehicle_no, "TN01AB1234");
    assert_eq!(trucker.vehicle_type, "Heavy Truck");
    assert_eq!(trucker.capacity, 25.0);

    let session = state.sessions.get(&phone).await.unwrap();
    assert_eq!(session.context, None);
    assert_eq!(session.role, UserRole::Trucker);
    assert_eq!(session.user_id, Some(trucker.id.to_string()));
    let success = state
        .notifier
        .template_params(&phone, "registration_success")
        .unwrap();
    assert!(success.contains(&("user_id", trucker.id.to_string())));
}

#[tokio::test]
async fn should_register_trucker_through_buttons() {
    let state = guided_app();
    let phone = unique_phone();

    say(&state, &phone, "hi").await;
    tap(&state, &phone, "role_trucker").await;
    say(&state, &phone, "Rajesh Kumar").await;
    say(&state, &phone, "tn01ab1234").await;
    tap(&state, &phone, "vehicle_heavy").await;
    say(&state, &phone, "15").await;

    let summary = state
        .notifier
        .template_params(&phone, "registration_confirmation")
        .unwrap();
    assert!(summary.contains(&("vehicle_type", "Heavy Truck".to_owned())));
    assert!(summary.contains(&("capacity", "15.0 tons".to_owned())));

    tap(&state, &phone, "confirm_yes").await;

    let trucker = state.store.get_trucker_by_phone(&phone).await.unwrap().unwrap();
    assert_eq!(trucker.name, "Rajesh Kumar");
    assert_eq!(trucker.vehicle_no, "TN01AB1234");
    assert_eq!(trucker.vehicle_type, "Heavy Truck");
    assert_eq!(trucker.capacity, 15.0);
    assert!(trucker.available);
    assert_eq!(context(&state, &phone).await, None);
    assert!(
        state
            .notifier
            .templates_to(&phone)
            .contains(&"registration_success".to_owned())
    );
}

#[tokio::test]
async fn should_keep_step_on_invalid_input() {
    let state = guided_app();
    let phone = unique_phone();
    say(&state, &phone, "hi").await;
    tap(&state, &phone, "role_trucker").await;

    say(&state, &phone, "Al").await;

    assert!(
        state
            .notifier
            .last_text_to(&phone)
            .unwrap()
            .contains("at least 3 characters")
    );
    assert_eq!(
        context(&state, &phone).await,
        Some(FlowState::TruckerRegistration {
            step: TruckerStep::ValidateName,
            data: TruckerRegistrationData::default(),
        })
    );
}

#[tokio::test]
async fn should_restart_with_empty_data_when_user_answers_no() {
    let state = guided_app();
    let phone = unique_phone();
    register_trucker_up_to_confirmation(&state, &phone).await;

    say(&state, &phone, "NO").await;

    assert_eq!(
        context(&state, &phone).await,
        Some(FlowState::TruckerRegistration {
            step: TruckerStep::ValidateName,
            data: TruckerRegistrationData::default(),
        })
    );
    assert!(state.store.get_trucker_by_phone(&phone).await.unwrap().is_none());
}

#[tokio::test]
async fn should_stay_on_confirmation_when_vehicle_is_taken() {
    let state = guided_app();
    let other = unique_phone();
    let phone = unique_phone();
    register_trucker_up_to_confirmation(&state, &other).await;
    say(&state, &other, "YES").await;

    register_trucker_up_to_confirmation(&state, &phone).await;
    say(&state, &phone, "YES").await;

    assert!(
        state
            .notifier
            .last_text_to(&phone)
            .unwrap()
            .contains("vehicle is already registered")
    );
    assert!(matches!(
        context(&state, &phone).await,
        Some(FlowState::TruckerRegistration {
            step: TruckerStep::ConfirmRegistration,
            ..
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn should_send_deferred_welcome_after_registration() {
    let (state, worker) = test_app(InteractionMode::Guided);
    tokio::spawn(worker.run());
    let phone = unique_phone();

    register_trucker_up_to_confirmation(&state, &phone).await;
    say(&state, &phone, "YES").await;
    assert!(
        !state
            .notifier
            .templates_to(&phone)
            .contains(&"welcome_trucker".to_owned())
    );

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;

    assert!(
        state
            .notifier
            .templates_to(&phone)
            .contains(&"welcome_trucker".to_owned())
    );
}

// ── Shipper registration ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_shipper_with_state_from_gst() {
    let state = guided_app();
    let phone = unique_phone();
    say(&state, &phone, "hi").await;
    tap(&state, &phone, "role_shipper").await;
    say(&state, &phone, "ABC Logistics").await;
    say(&state, &phone, "29abcde1234f1z5").await;
    say(&state, &phone, "Priya Sharma").await;

    assert!(
        state
            .notifier
            .last_text_to(&phone)
            .unwrap()
            .contains("Karnataka")
    );
    say(&state, &phone, "yes").await;

    let shipper = state.store.get_shipper_by_phone(&phone).await.unwrap().unwrap();
    assert_eq!(shipper.company_name, "ABC Logistics");
    assert_eq!(shipper.gst_number, "29ABCDE1234F1Z5");
    assert_eq!(shipper.state, "Karnataka");
    assert_eq!(shipper.contact_name.as_deref(), Some("Priya Sharma"));
    assert_eq!(context(&state, &phone).await, None);
}

// ── Known senders ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_show_menu_to_known_trucker_and_answer_selection() {
    let state = guided_app();
    let phone = unique_phone();
    let trucker = seed_trucker(&state, &phone, "Rajesh Kumar").await;

    say(&state, &phone, "hi").await;
    assert!(
        state
            .notifier
            .templates_to(&phone)
            .contains(&"trucker_main_menu".to_owned())
    );
    assert_eq!(context(&state, &phone).await, Some(FlowState::MainMenu));

    tap(&state, &phone, "menu_update_profile").await;
    let profile = state.notifier.last_text_to(&phone).unwrap();
    assert!(profile.contains(&trucker.id.to_string()));
    assert!(profile.contains(&trucker.vehicle_no));
}

#[tokio::test]
async fn should_greet_known_shipper_with_commands() {
    let state = guided_app();
    let phone = unique_phone();
    seed_shipper(&state, &phone, "29ABCDE1234F1Z5").await;

    say(&state, &phone, "hello").await;

    let greeting = state.notifier.last_text_to(&phone).unwrap();
    assert!(greeting.contains("Priya Sharma"));
    assert!(greeting.contains("MY LOADS"));
    assert_eq!(context(&state, &phone).await, None);
}

#[tokio::test]
async fn should_run_booking_commands_from_guided_mode() {
    let state = guided_app();
    let shipper = seed_shipper(&state, &unique_phone(), "29ABCDE1234F1Z5").await;
    let phone = unique_phone();
    seed_trucker(&state, &phone, "Rajesh Kumar").await;
    state.notifier.fail_templates(true);

    say(&state, &phone, "POST x").await;
    assert!(
        state
            .notifier
            .last_text_to(&phone)
            .unwrap()
            .contains("register as shipper")
    );

    let load_id = crate::helpers::seed_load(&state, &shipper).await;
    tap(&state, &phone, &format!("book_{load_id}")).await;

    let reply = state.notifier.last_text_to(&phone).unwrap();
    assert!(reply.contains("Booking Confirmed"), "unexpected reply: {reply}");
    assert!(reply.contains(&load_id.to_string()));
}
