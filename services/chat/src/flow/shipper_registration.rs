//! Business sign-up: company, GST number (state derived from it), contact
//! person, then a YES/NO confirmation.

use tracing::{info, warn};

use cargolink_domain::role::UserRole;

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::NewShipper;
use crate::error::ChatServiceError;
use crate::flow::{StepInput, StepOutcome, parse_confirmation, reject};
use crate::session::FlowState;
use crate::session::context::{ShipperRegistrationData, ShipperStep};
use crate::state::AppState;
use crate::usecase::notify;
use crate::usecase::registration::{validate_company, validate_contact_name, validate_gst};

const COMPANY_PROMPT: &str = "Welcome! Let's register your business. 🏭\n\nWhat's your company name?\n\nExample: ABC Logistics Pvt Ltd";

fn at(step: ShipperStep, data: ShipperRegistrationData) -> StepOutcome {
    StepOutcome::Advance(FlowState::ShipperRegistration { step, data })
}

pub async fn handle<S: Storage, N: Notifier>(
    state: &AppState<S, N>,
    phone: &str,
    step: ShipperStep,
    mut data: ShipperRegistrationData,
    input: StepInput<'_>,
) -> Result<StepOutcome, ChatServiceError> {
    let notifier = state.notifier.as_ref();
    match step {
        ShipperStep::CollectCompany => {
            notify::text(notifier, phone, COMPANY_PROMPT).await;
            Ok(at(ShipperStep::ValidateCompany, data))
        }

        ShipperStep::ValidateCompany => {
            let company = match validate_company(input.text) {
                Ok(c) => c,
                Err(e) => return reject(state, phone, &e).await,
            };
            let reply = format!(
                "Thank you! 🏢\n\n*{company}*\n\nNow, please enter your GST number for verification.\n\nFormat: 29ABCDE1234F1Z5\n(15 characters)"
            );
            notify::text(notifier, phone, &reply).await;
            data.company = Some(company);
            Ok(at(ShipperStep::ValidateGst, data))
        }

        ShipperStep::ValidateGst => {
            let (gst, gst_state) = match validate_gst(input.text) {
                Ok(v) => v,
                Err(e) => return reject(state, phone, &e).await,
            };
            let reply = format!(
                "⏳ Verifying GST...\n\n✅ *GST Verified Successfully!*\n\n*Company:* {}\n*GST:* {gst}\n*State:* {gst_state}\n\nWho will be the primary contact person?\n\nPlease enter their full name:",
                data.company.as_deref().unwrap_or_default()
            );
            notify::text(notifier, phone, &reply).await;
            data.gst = Some(gst);
            data.state = Some(gst_state.to_owned());
            Ok(at(ShipperStep::CollectContactName, data))
        }

        ShipperStep::CollectContactName => {
            let contact = match validate_contact_name(input.text) {
                Ok(c) => c,
                Err(e) => return reject(state, phone, &e).await,
            };
            data.contact_name = Some(contact);
            let summary = format!(
                "📋 *Please confirm your business details:*\n\n*Company:* {}\n*GST:* {}\n*State:* {}\n*Contact:* {}\n*Mobile:* {phone}\n\nReply YES to confirm or NO to start over.",
                data.company.as_deref().unwrap_or_default(),
                data.gst.as_deref().unwrap_or_default(),
                data.state.as_deref().unwrap_or_default(),
                data.contact_name.as_deref().unwrap_or_default(),
            );
            notify::text(notifier, phone, &summary).await;
            Ok(at(ShipperStep::ConfirmRegistration, data))
        }

        ShipperStep::ConfirmRegistration => match parse_confirmation(input) {
            Some(true) => register(state, phone, data).await,
            Some(false) => {
                info!(phone, "shipper registration restarted");
                Ok(StepOutcome::Handoff(FlowState::shipper_registration()))
            }
            None => {
                notify::text(notifier, phone, "Please reply YES to confirm or NO to start over.")
                    .await;
                Ok(StepOutcome::Stay)
            }
        },
    }
}

async fn register<S: Storage, N: Notifier>(
    state: &AppState<S, N>,
    phone: &str,
    data: ShipperRegistrationData,
) -> Result<StepOutcome, ChatServiceError> {
    let ShipperRegistrationData {
        company: Some(company),
        gst: Some(gst),
        state: Some(gst_state),
        contact_name,
    } = data
    else {
        warn!(phone, "confirmation reached with missing fields; restarting");
        return Ok(StepOutcome::Handoff(FlowState::shipper_registration()));
    };

    let shipper = match state
        .registration()
        .register_shipper(NewShipper {
            company_name: company,
            contact_name,
            gst_number: gst,
            phone: phone.to_owned(),
            state: gst_state,
        })
        .await
    {
        Ok(s) => s,
        Err(e) if !e.is_transient() => {
            let reply = format!("{}\n\nReply NO to start over.", e.user_message());
            notify::text(state.notifier.as_ref(), phone, &reply).await;
            return Ok(StepOutcome::Stay);
        }
        Err(e) => return Err(e),
    };

    let (user_id, display_name) = (shipper.id.to_string(), shipper.company_name.clone());
    state
        .sessions
        .update(phone, |s| {
            s.role = UserRole::Shipper;
            s.user_id = Some(user_id);
            s.name = display_name;
        })
        .await?;

    let fallback = format!(
        "🎉 *Registration Successful!*\n\nWelcome to CargoLink, {}!\n\n*Shipper ID:* {}\n*GST:* {}\n*State:* {}\n\nType POST to post your first load.",
        shipper.company_name, shipper.id, shipper.gst_number, shipper.state
    );
    notify::template_or_text(
        state.notifier.as_ref(),
        phone,
        "registration_success",
        &[
            ("name", shipper.company_name.clone()),
            ("user_id", shipper.id.to_string()),
            ("vehicle_number", shipper.gst_number.clone()),
        ],
        &fallback,
    )
    .await;
    Ok(StepOutcome::Finish)
}
