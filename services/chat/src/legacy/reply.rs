//! Chat renderings shared by the command dispatcher and the guided menus.

use std::fmt::Write as _;

use cargolink_domain::status::{BookingStatus, LoadStatus};

use crate::domain::types::{Booking, Load, Trucker, rupees};
use crate::usecase::booking::BookingView;

/// Entries shown in any listing before it is cut off.
pub const MAX_LISTED: usize = 5;

pub const HELP_TEXT: &str = "🚛 *Welcome to CargoLink!*\n\n\
*For Truckers:*\n\
📝 REGISTER - Register as trucker\n\
🔍 LOAD <from> <to> - Search loads\n\
📦 BOOK <LoadID> - Book a load\n\
📊 STATUS - Check your bookings\n\
📍 ARRIVED <BookingID> - At pickup point\n\
✅ PICKUP <BookingID> <OTP> - Confirm pickup\n\
🏁 DELIVER <BookingID> - At delivery point\n\
🚨 EMERGENCY or SOS - Emergency help\n\
⏰ DELAY <BookingID> <reason> - Report delay\n\
💰 NEGOTIATE <LoadID> <price> - Counter-offer\n\
🔧 BREAKDOWN - Vehicle breakdown\n\
❌ CANCEL <BookingID> - Cancel booking\n\n\
*For Shippers:*\n\
🏭 REGISTER SHIPPER - Register business\n\
📦 POST - Post new load\n\
📋 MY LOADS - View your loads\n\
📍 TRACK <ID> - Track load or booking\n\n\
🆘 SUPPORT <message> - Get help\n\n\
💰 48-hour payment guarantee!";

pub const SHIPPER_COMMANDS: &str = "📦 POST - Post a new load\n\
📋 MY LOADS - View your loads\n\
📍 TRACK <ID> - Track a load or booking\n\
🆘 SUPPORT <message> - Get help";

/// Salutation for the local hour of day.
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..12 => "Good morning",
        12..17 => "Good afternoon",
        _ => "Good evening",
    }
}

pub fn booking_status_label(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Confirmed => "✅ Confirmed",
        BookingStatus::InTransit => "🚛 In Transit",
        BookingStatus::Delivered => "📦 Delivered",
        BookingStatus::Completed => "💰 Completed",
        BookingStatus::Cancelled => "❌ Cancelled",
    }
}

pub fn load_status_emoji(status: LoadStatus) -> &'static str {
    match status {
        LoadStatus::Available => "🟢",
        LoadStatus::Booked => "🟡",
        LoadStatus::Completed => "✅",
    }
}

/// Available loads for a trucker, at most [`MAX_LISTED`], ending with a BOOK hint.
pub fn load_listing(title: &str, trucker: &Trucker, loads: &[Load]) -> String {
    let mut out = format!(
        "🚛 *{title}*\n👤 *For:* {} ({})\n\n",
        trucker.name, trucker.vehicle_type
    );
    for (n, load) in loads.iter().take(MAX_LISTED).enumerate() {
        let _ = write!(
            out,
            "*{}. Load ID:* {}\n🛣️ Route: {}\n📦 Material: {}\n⚖️ Weight: {} tons\n💰 Price: {}\n🚚 Vehicle: {}\n\n",
            n + 1,
            load.id,
            load.route(),
            load.material,
            load.weight,
            rupees(load.price),
            load.vehicle_type
        );
    }
    if let Some(first) = loads.first() {
        let _ = write!(out, "To book, type: BOOK <Load_ID>\nExample: BOOK {}", first.id);
    }
    out
}

fn booking_entry(out: &mut String, booking: &Booking, load: &Load) {
    let _ = write!(
        out,
        "*{}*\n🛣️ {}\n💰 {} (you get {})\n📊 Status: {}\n",
        booking.id,
        load.route(),
        rupees(booking.agreed_price),
        rupees(booking.net_amount),
        booking_status_label(booking.status)
    );
    if let Some(hint) = booking.next_action_hint() {
        let _ = writeln!(out, "👉 Type: {hint}");
    }
    out.push('\n');
}

/// Active bookings with the next command to send for each.
pub fn active_bookings(views: &[BookingView]) -> String {
    let active: Vec<_> = views.iter().filter(|v| v.booking.status.is_active()).collect();
    if active.is_empty() {
        return "📊 *Your Status*\n\nNo active bookings.\n\nSearch for loads: LOAD <from> <to>"
            .to_owned();
    }
    let mut out = String::from("📊 *Your Status*\n\n");
    for view in active.into_iter().take(MAX_LISTED) {
        booking_entry(&mut out, &view.booking, &view.load);
    }
    out.trim_end().to_owned()
}

/// Recent bookings of any status.
pub fn recent_bookings(views: &[BookingView]) -> String {
    if views.is_empty() {
        return "📋 *My Bookings*\n\nNo bookings yet.\n\nReply 1 to find loads.".to_owned();
    }
    let mut out = String::from("📋 *My Bookings*\n\n");
    for view in views.iter().take(MAX_LISTED) {
        booking_entry(&mut out, &view.booking, &view.load);
    }
    if views.len() > MAX_LISTED {
        let _ = writeln!(out, "... and {} more bookings", views.len() - MAX_LISTED);
    }
    out.trim_end().to_owned()
}

pub fn trucker_profile(trucker: &Trucker) -> String {
    format!(
        "👤 *My Profile*\n\n*Trucker ID:* {}\n*Name:* {}\n*Phone:* {}\n*Vehicle:* {} ({})\n*Capacity:* {:.1} tons\n*Rating:* ⭐ {:.1}\n*Trips:* {}\n*Status:* {}\n\nTo change your details, type SUPPORT <message>.",
        trucker.id,
        trucker.name,
        trucker.phone,
        trucker.vehicle_no,
        trucker.vehicle_type,
        trucker.capacity,
        trucker.rating,
        trucker.total_trips,
        if trucker.available {
            "🟢 Available"
        } else {
            "🟡 On a trip"
        }
    )
}
