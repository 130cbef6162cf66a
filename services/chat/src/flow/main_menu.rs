use chrono::{Local, Timelike};

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::{LoadSearch, Shipper, Trucker};
use crate::error::ChatServiceError;
use crate::flow::StepInput;
use crate::legacy::reply;
use crate::state::AppState;
use crate::usecase::notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    FindLoads,
    MyBookings,
    Profile,
}

fn menu_option(input: StepInput<'_>) -> Option<MenuOption> {
    let key = input.payload.unwrap_or(input.text).to_lowercase();
    match key.as_str() {
        "1" | "menu_find_loads" | "find_loads" => Some(MenuOption::FindLoads),
        "2" | "menu_my_bookings" | "my_bookings" => Some(MenuOption::MyBookings),
        "3" | "menu_update_profile" | "update_profile" => Some(MenuOption::Profile),
        _ => None,
    }
}

/// Show the trucker menu, greeting by the local time of day.
pub async fn enter<S: Storage, N: Notifier>(state: &AppState<S, N>, trucker: &Trucker) {
    let greeting = reply::greeting(Local::now().hour());
    let fallback = format!(
        "{greeting} {}! 👋\n\nWhat would you like to do today?\n\n1️⃣ Find Loads\n2️⃣ My Bookings\n3️⃣ My Profile\n\nReply with 1, 2, or 3",
        trucker.name
    );
    notify::template_or_text(
        state.notifier.as_ref(),
        &trucker.phone,
        "trucker_main_menu",
        &[
            ("greeting", greeting.to_owned()),
            ("name", trucker.name.clone()),
        ],
        &fallback,
    )
    .await;
}

/// Answer a menu selection. Anything unrecognised shows the menu again.
pub async fn handle<S: Storage, N: Notifier>(
    state: &AppState<S, N>,
    trucker: &Trucker,
    input: StepInput<'_>,
) -> Result<(), ChatServiceError> {
    let body = match menu_option(input) {
        Some(MenuOption::FindLoads) => {
            let loads = state.load_queries().search(&LoadSearch::default()).await?;
            if loads.is_empty() {
                "😔 No loads available right now.\n\nWe'll notify you as soon as a new load is posted.".to_owned()
            } else {
                reply::load_listing("Available Loads", trucker, &loads)
            }
        }
        Some(MenuOption::MyBookings) => {
            let views = state.booking_actions().list_for_trucker(trucker).await?;
            reply::recent_bookings(&views)
        }
        Some(MenuOption::Profile) => reply::trucker_profile(trucker),
        None => {
            enter(state, trucker).await;
            return Ok(());
        }
    };
    notify::text(state.notifier.as_ref(), &trucker.phone, &body).await;
    Ok(())
}

/// Known shippers get a greeting and their command list.
pub async fn greet_shipper<S: Storage, N: Notifier>(state: &AppState<S, N>, shipper: &Shipper) {
    let greeting = reply::greeting(Local::now().hour());
    let contact = shipper
        .contact_name
        .as_deref()
        .unwrap_or(&shipper.company_name);
    let body = format!(
        "{greeting}! Welcome back to CargoLink.\n\n{contact}, what can we help you with today?\n\n{}",
        reply::SHIPPER_COMMANDS
    );
    notify::text(state.notifier.as_ref(), &shipper.phone, &body).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_menu_buttons_and_numbers() {
        let button = StepInput {
            text: "",
            payload: Some("menu_my_bookings"),
        };
        assert_eq!(menu_option(button), Some(MenuOption::MyBookings));
        let number = StepInput {
            text: "1",
            payload: None,
        };
        assert_eq!(menu_option(number), Some(MenuOption::FindLoads));
        let other = StepInput {
            text: "hello",
            payload: None,
        };
        assert_eq!(menu_option(other), None);
    }
}
