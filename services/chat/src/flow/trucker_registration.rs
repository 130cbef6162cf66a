//! Trucker sign-up, one field per message:
//! name, vehicle number, vehicle type, capacity, then a YES/NO confirmation.

use std::time::Duration;

use tracing::{info, warn};

use cargolink_domain::role::UserRole;
use cargolink_domain::vehicle::VehicleType;

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::NewTrucker;
use crate::error::ChatServiceError;
use crate::flow::{StepInput, StepOutcome, parse_confirmation, reject};
use crate::jobs::deferred::DeferredMessage;
use crate::session::FlowState;
use crate::session::context::{TruckerRegistrationData, TruckerStep};
use crate::state::AppState;
use crate::usecase::notify;
use crate::usecase::registration::{parse_capacity, validate_person_name, validate_vehicle_no};

/// Delay before the follow-up welcome after a successful sign-up.
const WELCOME_DELAY: Duration = Duration::from_secs(2);

/// Second page of vehicle-type buttons.
const MORE_VEHICLES_PAYLOAD: &str = "vehicle_more";

const NAME_PROMPT: &str =
    "Great! Let's get you registered as a trucker. 🚛\n\nWhat's your full name?\n\nExample: Rajesh Kumar";

fn vehicle_type_menu() -> String {
    let mut menu = String::from("🚚 *Select your vehicle type:*\n\n");
    let tonnage = ["up to 2 tons", "2-7 tons", "7-25 tons", "25-40 tons", "20-32 ft", "other"];
    for (n, (vehicle, tons)) in VehicleType::ALL.iter().zip(tonnage).enumerate() {
        menu.push_str(&format!("{}. {} ({tons})\n", n + 1, vehicle.label()));
    }
    menu.push_str("\nReply with the number (1-6)");
    menu
}

fn at(step: TruckerStep, data: TruckerRegistrationData) -> StepOutcome {
    StepOutcome::Advance(FlowState::TruckerRegistration { step, data })
}

pub async fn handle<S: Storage, N: Notifier>(
    state: &AppState<S, N>,
    phone: &str,
    step: TruckerStep,
    mut data: TruckerRegistrationData,
    input: StepInput<'_>,
) -> Result<StepOutcome, ChatServiceError> {
    let notifier = state.notifier.as_ref();
    match step {
        TruckerStep::CollectName => {
            notify::template_or_text(notifier, phone, "trucker_registration_name", &[], NAME_PROMPT)
                .await;
            Ok(at(TruckerStep::ValidateName, data))
        }

        TruckerStep::ValidateName => {
            let name = match validate_person_name(input.text) {
                Ok(name) => name,
                Err(e) => return reject(state, phone, &e).await,
            };
            let reply = format!(
                "Nice to meet you, {name}! 👋\n\nNow, please enter your vehicle registration number.\n\nExample: TN01AB1234"
            );
            notify::text(notifier, phone, &reply).await;
            data.name = Some(name);
            Ok(at(TruckerStep::ValidateVehicle, data))
        }

        TruckerStep::ValidateVehicle => {
            let vehicle_no = match validate_vehicle_no(input.text) {
                Ok(v) => v,
                Err(e) => return reject(state, phone, &e).await,
            };
            let verified = format!("⏳ Verifying vehicle {vehicle_no}...\n\n✅ Vehicle verified!");
            notify::text(notifier, phone, &verified).await;
            notify::template_or_text(
                notifier,
                phone,
                "vehicle_type_selection",
                &[],
                &vehicle_type_menu(),
            )
            .await;
            data.vehicle_no = Some(vehicle_no);
            Ok(at(TruckerStep::ValidateVehicleType, data))
        }

        TruckerStep::ValidateVehicleType => {
            if input.payload == Some(MORE_VEHICLES_PAYLOAD) {
                notify::template_or_text(
                    notifier,
                    phone,
                    "vehicle_type_selection_more",
                    &[],
                    &vehicle_type_menu(),
                )
                .await;
                return Ok(StepOutcome::Stay);
            }
            let Some(vehicle_type) = VehicleType::resolve(input.payload, input.text) else {
                notify::text(
                    notifier,
                    phone,
                    "Please select a valid option (1-6) or click one of the buttons.",
                )
                .await;
                return Ok(StepOutcome::Stay);
            };
            let reply = format!(
                "Got it! {} selected. 🚛\n\nWhat's the load capacity of your vehicle in tons?\n\nExample: 15",
                vehicle_type.label()
            );
            notify::text(notifier, phone, &reply).await;
            data.vehicle_type = Some(vehicle_type);
            Ok(at(TruckerStep::ValidateCapacity, data))
        }

        TruckerStep::ValidateCapacity => {
            let capacity = match parse_capacity(input.text) {
                Ok(c) => c,
                Err(e) => return reject(state, phone, &e).await,
            };
            data.capacity = Some(capacity);
            send_confirmation(state, phone, &data).await;
            Ok(at(TruckerStep::ConfirmRegistration, data))
        }

        TruckerStep::ConfirmRegistration => match parse_confirmation(input) {
            Some(true) => register(state, phone, data).await,
            Some(false) => {
                info!(phone, "trucker registration restarted");
                Ok(StepOutcome::Handoff(FlowState::trucker_registration()))
            }
            None => {
                notify::text(notifier, phone, "Please reply YES to confirm or NO to start over.")
                    .await;
                Ok(StepOutcome::Stay)
            }
        },
    }
}

async fn send_confirmation<S: Storage, N: Notifier>(
    state: &AppState<S, N>,
    phone: &str,
    data: &TruckerRegistrationData,
) {
    let name = data.name.clone().unwrap_or_default();
    let vehicle_no = data.vehicle_no.clone().unwrap_or_default();
    let vehicle_type = data.vehicle_type.map(VehicleType::label).unwrap_or_default();
    let capacity = format!("{:.1} tons", data.capacity.unwrap_or_default());
    let fallback = format!(
        "📋 *Please confirm your details:*\n\n*Name:* {name}\n*Vehicle:* {vehicle_no}\n*Type:* {vehicle_type}\n*Capacity:* {capacity}\n\nReply YES to confirm or NO to start over."
    );
    notify::template_or_text(
        state.notifier.as_ref(),
        phone,
        "registration_confirmation",
        &[
            ("name", name),
            ("vehicle_number", vehicle_no),
            ("vehicle_type", vehicle_type.to_owned()),
            ("capacity", capacity),
        ],
        &fallback,
    )
    .await;
}

async fn register<S: Storage, N: Notifier>(
    state: &AppState<S, N>,
    phone: &str,
    data: TruckerRegistrationData,
) -> Result<StepOutcome, ChatServiceError> {
    let TruckerRegistrationData {
        name: Some(name),
        vehicle_no: Some(vehicle_no),
        vehicle_type: Some(vehicle_type),
        capacity: Some(capacity),
    } = data
    else {
        warn!(phone, "confirmation reached with missing fields; restarting");
        return Ok(StepOutcome::Handoff(FlowState::trucker_registration()));
    };

    let trucker = match state
        .registration()
        .register_trucker(NewTrucker {
            name,
            phone: phone.to_owned(),
            vehicle_no,
            vehicle_type: vehicle_type.label().to_owned(),
            capacity,
        })
        .await
    {
        Ok(t) => t,
        Err(e) if !e.is_transient() => {
            let reply = format!("{}\n\nReply NO to start over.", e.user_message());
            notify::text(state.notifier.as_ref(), phone, &reply).await;
            return Ok(StepOutcome::Stay);
        }
        Err(e) => return Err(e),
    };

    let (user_id, display_name) = (trucker.id.to_string(), trucker.name.clone());
    state
        .sessions
        .update(phone, |s| {
            s.role = UserRole::Trucker;
            s.user_id = Some(user_id);
            s.name = display_name;
        })
        .await?;

    let fallback = format!(
        "🎉 *Registration Successful!*\n\nWelcome to CargoLink, {}! Your Trucker ID is *{}*.\n\n*Vehicle:* {} ({})\n*Capacity:* {:.1} tons\n\nType LOAD <from> <to> to find loads on your route.",
        trucker.name, trucker.id, trucker.vehicle_no, trucker.vehicle_type, trucker.capacity
    );
    notify::template_or_text(
        state.notifier.as_ref(),
        phone,
        "registration_success",
        &[
            ("name", trucker.name.clone()),
            ("user_id", trucker.id.to_string()),
            ("vehicle_number", trucker.vehicle_no.clone()),
        ],
        &fallback,
    )
    .await;
    state.deferred.schedule(
        WELCOME_DELAY,
        DeferredMessage::template(phone, "welcome_trucker", vec![("name", trucker.name)]),
    );
    Ok(StepOutcome::Finish)
}
