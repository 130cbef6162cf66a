use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::domain::repository::Notifier;
use crate::session::SessionStore;

/// Remove expired sessions every `every`, forever.
pub async fn run_sweeper<N: Notifier>(sessions: Arc<SessionStore<N>>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        let removed = sessions.sweep().await;
        if removed > 0 {
            info!(removed, "expired sessions swept");
        }
    }
}
