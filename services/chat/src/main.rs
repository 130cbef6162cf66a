use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use cargolink_chat::config::ChatConfig;
use cargolink_chat::domain::repository::{Notifier, Storage};
use cargolink_chat::infra::db::DbStore;
use cargolink_chat::infra::memory::MemoryStore;
use cargolink_chat::infra::twilio::TwilioNotifier;
use cargolink_chat::jobs::sweeper::run_sweeper;
use cargolink_chat::router::build_router;
use cargolink_chat::state::AppState;

async fn serve<S: Storage, N: Notifier>(
    config: &ChatConfig,
    store: S,
    notifier: N,
) -> anyhow::Result<()> {
    let (state, worker) = AppState::new(
        Arc::new(store),
        Arc::new(notifier),
        chrono::Duration::minutes(config.session_ttl_minutes),
        config.interaction_mode,
    );

    tokio::spawn(worker.run());
    tokio::spawn(run_sweeper(
        Arc::clone(&state.sessions),
        Duration::from_secs(config.session_sweep_secs),
    ));

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.chat_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!(mode = config.interaction_mode.as_str(), "chat service listening on {addr}");
    axum::serve(listener, router).await.context("server error")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cargolink_core::tracing::init_tracing();

    let config = ChatConfig::from_env()?;
    let notifier = TwilioNotifier::new(&config.twilio_api_base, config.twilio.clone())?;

    match &config.database_url {
        Some(url) if !config.use_memory_store => {
            let db = Database::connect(url)
                .await
                .context("failed to connect to database")?;
            serve(&config, DbStore { db }, notifier).await
        }
        _ => {
            info!("using in-memory store; data is lost on restart");
            serve(&config, MemoryStore::new(), notifier).await
        }
    }
}
