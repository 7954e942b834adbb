//! Single-threaded event loop over Telegram updates and scheduler ticks.

use crate::core::scheduler::JournalTick;
use crate::handlers::{self, BotContext};
use crate::services::telegram::TelegramApi;
use crate::signals::format;
use crate::store::BotState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Long-poll wait passed to getUpdates
const POLL_TIMEOUT_SECS: u64 = 30;
/// Back-off after a failed poll before trying again
const POLL_RETRY_SECS: u64 = 3;

/// Owns the aggregate state and serializes every event against it.
///
/// One inbound event (an update batch entry or a journal tick) is fully
/// processed, including persistence, before the next is taken. This is the
/// whole concurrency model: no locks, no racing mutations.
pub struct BotRuntime {
    ctx: BotContext,
    api: Arc<TelegramApi>,
    state: BotState,
    ticks: mpsc::Receiver<JournalTick>,
    offset: i64,
}

impl BotRuntime {
    pub fn new(
        ctx: BotContext,
        api: Arc<TelegramApi>,
        state: BotState,
        ticks: mpsc::Receiver<JournalTick>,
    ) -> Self {
        Self {
            ctx,
            api,
            state,
            ticks,
            offset: 0,
        }
    }

    /// Run the event loop. Never returns under normal operation; the binary
    /// races it against a shutdown signal.
    pub async fn run(mut self) {
        info!("BotRuntime: event loop started");

        loop {
            let api = Arc::clone(&self.api);
            let offset = self.offset;

            tokio::select! {
                tick = self.ticks.recv() => {
                    match tick {
                        Some(_) => self.broadcast_journal().await,
                        None => {
                            // Scheduler gone; don't let a closed channel spin the loop
                            warn!("BotRuntime: scheduler channel closed");
                            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                        }
                    }
                }
                updates = api.get_updates(offset, POLL_TIMEOUT_SECS) => {
                    match updates {
                        Ok(batch) => {
                            for update in batch {
                                self.offset = self.offset.max(update.update_id + 1);
                                if let Some(message) = update.message {
                                    handlers::handle_message(&self.ctx, &mut self.state, &message)
                                        .await;
                                }
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "BotRuntime: polling failed, retrying in {}s", POLL_RETRY_SECS);
                            tokio::time::sleep(tokio::time::Duration::from_secs(POLL_RETRY_SECS))
                                .await;
                        }
                    }
                }
            }
        }
    }

    /// Render today's journal and fan it out to the channel and all owners
    async fn broadcast_journal(&mut self) {
        let date = self.ctx.today();
        let summary = self.state.journal.summarize(&date);
        let text = format::render_journal(&date, self.state.journal.for_date(&date), &summary);

        info!(date = %date, records = summary.count, "broadcasting journal for {}", date);

        if let Err(e) = self
            .ctx
            .transport
            .send_message(&self.ctx.channel, &text, None)
            .await
        {
            error!(channel = %self.ctx.channel, error = %e, "failed to post journal to channel");
        }
        for owner in self.state.owners.list() {
            if let Err(e) = self
                .ctx
                .transport
                .send_message(&owner.to_string(), &text, None)
                .await
            {
                warn!(owner = owner, error = %e, "failed to DM journal to owner {}", owner);
            }
        }
    }
}
