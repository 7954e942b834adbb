//! Signalpost Bot
//!
//! Long-polls Telegram for owner commands and status replies, relays signals
//! to the broadcast channel, and sends the daily journal on schedule.

use dotenvy::dotenv;
use signalpost::config;
use signalpost::core::runtime::BotRuntime;
use signalpost::core::scheduler::JournalScheduler;
use signalpost::db::{JsonFileBackend, StateBackend};
use signalpost::handlers::BotContext;
use signalpost::logging;
use signalpost::services::telegram::TelegramApi;
use signalpost::services::Transport;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    // Initialize logging based on environment
    logging::init_logging();

    let env = config::get_environment();
    info!("Starting Signalpost Bot");
    info!(environment = %env, "Environment");

    let token = config::get_bot_token().ok_or("BOT_TOKEN must be set")?;
    let channel = config::get_channel().ok_or("CHANNEL_USERNAME must be set")?;
    let timezone = config::get_timezone();
    let close_policy = config::get_close_policy();
    let data_file = config::get_data_file();

    info!(channel = %channel, timezone = %timezone, policy = ?close_policy, "Configuration loaded");

    // Load the persisted state document
    let backend: Arc<dyn StateBackend> = Arc::new(JsonFileBackend::new(&data_file));
    let mut state = backend.load().await?;
    info!(
        path = %data_file,
        signals = state.signals.len(),
        "State loaded with {} live signals",
        state.signals.len()
    );

    // Backward-compatible owner seeding for documents without an owner set
    let initial_owners = config::get_initial_owner_ids();
    if state.owners.seed_if_empty(&initial_owners) {
        backend.save(&state).await?;
        info!(count = initial_owners.len(), "Seeded owner set from OWNER_IDS");
    }
    if state.owners.is_empty() {
        return Err("no owners configured: set OWNER_IDS".into());
    }

    let api = Arc::new(TelegramApi::new(token));
    let transport: Arc<dyn Transport> = api.clone();

    // Scheduler feeds journal ticks into the runtime's event loop
    let (tick_tx, tick_rx) = mpsc::channel(1);
    let scheduler = JournalScheduler::new(&config::get_journal_cron(), timezone, tick_tx)
        .map_err(|e| format!("Failed to create scheduler: {}", e))?;
    scheduler.start().await;

    let ctx = BotContext::new(transport, backend, channel, close_policy, timezone);
    let runtime = BotRuntime::new(ctx, api, state, tick_rx);

    info!("Bot started, waiting for updates...");
    tokio::select! {
        _ = runtime.run() => {}
        _ = signal::ctrl_c() => {
            info!("Shutting down bot...");
            scheduler.stop().await;
            info!("Bot stopped");
        }
    }

    Ok(())
}
