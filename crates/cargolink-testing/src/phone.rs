use std::sync::atomic::{AtomicU32, Ordering};

use cargolink_domain::phone::WHATSAPP_PREFIX;

static NEXT: AtomicU32 = AtomicU32::new(1);

/// A fresh `+91` mobile number, distinct within the test process.
pub fn unique_phone() -> String {
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    format!("+9198{n:08}")
}

/// `phone` in the form the messaging provider sends it.
pub fn whatsapp_address(phone: &str) -> String {
    format!("{WHATSAPP_PREFIX}{phone}")
}
