use crate::models::signal::{Direction, StatusKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One realized outcome, permanently appended to the day's journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub signal_id: String,
    pub direction: Direction,
    pub symbol: String,
    pub entry: f64,
    pub stop_loss: f64,
    /// Which status produced this record (never `Cancel`)
    pub action: StatusKind,
    /// Fill price supplied by the operator
    pub price: f64,
    /// Realized movement divided by the entry-to-stop distance
    pub risk_multiple: f64,
    /// Direction-aware raw price delta
    pub profit_price_units: f64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregates over one journal day.
///
/// A record counts as a win iff `risk_multiple > 0`; zero is a loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalSummary {
    pub count: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_r: f64,
    pub total_price_delta: f64,
}
