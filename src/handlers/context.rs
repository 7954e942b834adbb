//! Shared dependencies injected into command and status handlers.

use crate::db::StateBackend;
use crate::services::Transport;
use crate::signals::lifecycle::ClosePolicy;
use chrono::Utc;
use chrono_tz::Tz;
use std::sync::Arc;

/// Read-only handler environment.
///
/// The mutable `BotState` is not in here: it is owned by the
/// runtime and passed into each handler by reference, so nothing mutates
/// state outside the single event loop.
pub struct BotContext {
    pub transport: Arc<dyn Transport>,
    pub backend: Arc<dyn StateBackend>,
    /// Broadcast channel destination (e.g. `@mychannel`)
    pub channel: String,
    pub close_policy: ClosePolicy,
    /// Reporting time zone for journal day boundaries
    pub timezone: Tz,
}

impl BotContext {
    pub fn new(
        transport: Arc<dyn Transport>,
        backend: Arc<dyn StateBackend>,
        channel: String,
        close_policy: ClosePolicy,
        timezone: Tz,
    ) -> Self {
        Self {
            transport,
            backend,
            channel,
            close_policy,
            timezone,
        }
    }

    /// Today's journal date string in the reporting time zone
    pub fn today(&self) -> String {
        Utc::now()
            .with_timezone(&self.timezone)
            .format("%Y-%m-%d")
            .to_string()
    }
}
