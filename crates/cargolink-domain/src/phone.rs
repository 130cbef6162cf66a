//! Phone number normalization.

/// Prefix the WhatsApp transport adds to sender addresses.
pub const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Strip the transport prefix and surrounding whitespace from an inbound sender address.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix(WHATSAPP_PREFIX)
        .unwrap_or(trimmed)
        .trim()
        .to_owned()
}
