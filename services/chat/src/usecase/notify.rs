//! Best-effort delivery helpers shared by flows and actions.
//!
//! A failed send after a committed domain action is logged and swallowed.

use tracing::warn;

use crate::domain::repository::Notifier;

/// Send a template. Returns whether it was delivered.
pub async fn try_template<N: Notifier>(
    notifier: &N,
    phone: &str,
    template: &str,
    params: &[(&'static str, String)],
) -> bool {
    match notifier.send_template(phone, template, params).await {
        Ok(()) => true,
        Err(e) => {
            warn!(phone, template, error = %e, "template send failed");
            false
        }
    }
}

/// Send plain text, logging failures.
pub async fn text<N: Notifier>(notifier: &N, phone: &str, body: &str) -> bool {
    match notifier.send_text(phone, body).await {
        Ok(()) => true,
        Err(e) => {
            warn!(phone, error = %e, "text send failed");
            false
        }
    }
}

/// Send a template, falling back to plain text when the template fails.
pub async fn template_or_text<N: Notifier>(
    notifier: &N,
    phone: &str,
    template: &str,
    params: &[(&'static str, String)],
    fallback: &str,
) -> bool {
    if try_template(notifier, phone, template, params).await {
        return true;
    }
    text(notifier, phone, fallback).await
}
