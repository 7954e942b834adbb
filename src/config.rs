//! Environment-backed configuration accessors.
//!
//! All settings come from the process environment (a `.env` file is loaded by
//! the binary at startup). Accessors apply defaults where a sensible default
//! exists; required settings return `Option` and are enforced at the call
//! site.

use crate::signals::lifecycle::ClosePolicy;
use chrono_tz::Tz;
use std::env;

/// Deployment environment name ("production" enables JSON logs)
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Bot API token from @BotFather. Required.
pub fn get_bot_token() -> Option<String> {
    env::var("BOT_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Broadcast channel, e.g. `@mychannel` or a numeric chat id. Required.
pub fn get_channel() -> Option<String> {
    env::var("CHANNEL_USERNAME").ok().filter(|c| !c.is_empty())
}

/// Path of the persisted state document
pub fn get_data_file() -> String {
    env::var("DATA_FILE").unwrap_or_else(|_| "data.json".to_string())
}

/// Initial owner allow-list, comma-separated subscriber ids.
///
/// Only used to seed the persisted owner set when it is empty; afterwards the
/// set is managed with /addowner and /removeowner.
pub fn get_initial_owner_ids() -> Vec<i64> {
    env::var("OWNER_IDS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// Reporting time zone for journal day boundaries and the daily schedule
pub fn get_timezone() -> Tz {
    env::var("TIMEZONE")
        .ok()
        .and_then(|tz| tz.parse().ok())
        .unwrap_or(chrono_tz::Asia::Jakarta)
}

/// Cron expression (with seconds field) for the daily journal broadcast
pub fn get_journal_cron() -> String {
    env::var("JOURNAL_CRON").unwrap_or_else(|_| "0 30 23 * * *".to_string())
}

/// Which status updates close a signal and remove it from the live store
pub fn get_close_policy() -> ClosePolicy {
    env::var("CLOSE_POLICY")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_default()
}
