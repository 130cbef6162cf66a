use tracing::info;

use crate::domain::repository::{Notifier, Storage};
use crate::error::ChatServiceError;
use crate::flow::{StepInput, StepOutcome};
use crate::session::FlowState;
use crate::session::context::WelcomeStep;
use crate::state::AppState;
use crate::usecase::notify;

const WELCOME_TEXT: &str = "🚛 *Welcome to CargoLink!*\n\n\
India's trusted freight network connecting truckers and shippers.\n\n\
Are you a:\n\
1️⃣ Trucker / Driver - Find loads\n\
2️⃣ Shipper / Company - Post loads\n\
3️⃣ Learn more\n\n\
Reply with 1, 2 or 3";

const ROLE_REMINDER: &str = "Please choose how you want to use CargoLink:\n\n\
1️⃣ Trucker / Driver\n\
2️⃣ Shipper / Company\n\
3️⃣ Learn more";

const ABOUT_TEXT: &str = "ℹ️ *About CargoLink*\n\n\
🚛 *Truckers* find verified loads on their routes, book with one tap and get paid within 48 hours of delivery.\n\n\
🏭 *Shippers* post loads in seconds and track every booking from pickup to delivery with OTP-secured handovers.\n\n\
Reply 1 to register as a trucker or 2 to register as a shipper.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleChoice {
    Trucker,
    Shipper,
    LearnMore,
}

fn role_choice(input: StepInput<'_>) -> Option<RoleChoice> {
    match input.payload {
        Some("role_trucker") => return Some(RoleChoice::Trucker),
        Some("role_shipper") => return Some(RoleChoice::Shipper),
        Some("learn_more") => return Some(RoleChoice::LearnMore),
        _ => {}
    }
    let text = input.text.to_lowercase();
    if text == "1" || text.contains("truck") || text.contains("driver") {
        Some(RoleChoice::Trucker)
    } else if text == "2" || text.contains("ship") || text.contains("company") {
        Some(RoleChoice::Shipper)
    } else if text == "3" || text.contains("learn") {
        Some(RoleChoice::LearnMore)
    } else {
        None
    }
}

pub async fn handle<S: Storage, N: Notifier>(
    state: &AppState<S, N>,
    phone: &str,
    step: WelcomeStep,
    input: StepInput<'_>,
) -> Result<StepOutcome, ChatServiceError> {
    let notifier = state.notifier.as_ref();
    match step {
        WelcomeStep::Initial => {
            notify::template_or_text(notifier, phone, "new_user_welcome", &[], WELCOME_TEXT).await;
            Ok(StepOutcome::Advance(FlowState::Welcome {
                step: WelcomeStep::RoleSelection,
            }))
        }
        WelcomeStep::RoleSelection => match role_choice(input) {
            Some(RoleChoice::Trucker) => {
                info!(phone, role = "trucker", "role selected");
                Ok(StepOutcome::Handoff(FlowState::trucker_registration()))
            }
            Some(RoleChoice::Shipper) => {
                info!(phone, role = "shipper", "role selected");
                Ok(StepOutcome::Handoff(FlowState::shipper_registration()))
            }
            Some(RoleChoice::LearnMore) => {
                notify::text(notifier, phone, ABOUT_TEXT).await;
                Ok(StepOutcome::Stay)
            }
            None => {
                notify::text(notifier, phone, ROLE_REMINDER).await;
                Ok(StepOutcome::Stay)
            }
        },
    }
}
