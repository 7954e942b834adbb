//! Signal lifecycle: creation, status transitions and R-multiple outcomes.
//!
//! All duplicate detection lives here: `apply_status` is the single
//! transition-validation point and returns a typed result, so callers never
//! branch on raw boolean flags or re-announce an already-recorded status.

use crate::models::journal::JournalRecord;
use crate::models::signal::{Direction, Signal, StatusFlags, StatusKind};
use chrono::Utc;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Maximum number of take-profit slots a signal may carry
pub const MAX_TAKE_PROFITS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("{0} already recorded")]
    AlreadyRecorded(String),
    #[error("signal not found: {0}")]
    NotFound(String),
}

/// Which status updates remove a signal from the live store.
///
/// `Terminal` (default): entry hit, stop-loss and the final configured
/// take-profit close; intermediate take-profits only annotate.
/// `EveryHit`: any recorded status closes. Cancel always closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClosePolicy {
    #[default]
    Terminal,
    EveryHit,
}

impl FromStr for ClosePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "terminal" => Ok(ClosePolicy::Terminal),
            "every-hit" | "everyhit" => Ok(ClosePolicy::EveryHit),
            other => Err(format!("unknown close policy: {}", other)),
        }
    }
}

/// Result of a successful status transition
#[derive(Debug, Clone, PartialEq)]
pub struct StatusOutcome {
    pub kind: StatusKind,
    pub price: Option<f64>,
    /// Whether the signal should now leave the live store
    pub closes: bool,
    /// Journal candidate, present iff a fill price was supplied
    pub record: Option<JournalRecord>,
}

/// Construct a new signal with a fresh id and all status flags cleared.
///
/// The symbol is normalized to uppercase with all whitespace removed. At most
/// `MAX_TAKE_PROFITS` slots are kept; extra slots are dropped.
pub fn create_signal(
    direction: Direction,
    symbol: &str,
    entry: f64,
    stop_loss: f64,
    mut take_profits: Vec<Option<f64>>,
) -> Result<Signal, LifecycleError> {
    let symbol: String = symbol
        .split_whitespace()
        .collect::<String>()
        .to_uppercase();
    if symbol.is_empty() {
        return Err(LifecycleError::InvalidFormat("symbol is empty".to_string()));
    }
    if !entry.is_finite() {
        return Err(LifecycleError::InvalidFormat(
            "entry is not a finite number".to_string(),
        ));
    }
    if !stop_loss.is_finite() {
        return Err(LifecycleError::InvalidFormat(
            "stop loss is not a finite number".to_string(),
        ));
    }
    take_profits.truncate(MAX_TAKE_PROFITS);
    if take_profits.iter().flatten().any(|tp| !tp.is_finite()) {
        return Err(LifecycleError::InvalidFormat(
            "take profit is not a finite number".to_string(),
        ));
    }

    let hits = StatusFlags {
        entry: false,
        stop_loss: false,
        take_profits: vec![false; take_profits.len()],
    };

    Ok(Signal {
        id: Uuid::new_v4().simple().to_string(),
        direction,
        symbol,
        entry,
        stop_loss,
        take_profits,
        hits,
        posted: None,
        created_at: Utc::now(),
    })
}

/// Apply a status update to a live signal.
///
/// Each of entry/stop-loss/tp-N fires at most once; a repeat yields
/// `AlreadyRecorded` and leaves the signal untouched. Cancel always succeeds,
/// closes, and never journals. The journal candidate in the outcome is only
/// produced when a fill price accompanies the update.
pub fn apply_status(
    signal: &mut Signal,
    kind: StatusKind,
    price: Option<f64>,
    policy: ClosePolicy,
) -> Result<StatusOutcome, LifecycleError> {
    match kind {
        StatusKind::Cancel => Ok(StatusOutcome {
            kind,
            price: None,
            closes: true,
            record: None,
        }),
        StatusKind::EntryHit => {
            if signal.hits.entry {
                return Err(LifecycleError::AlreadyRecorded("entry".to_string()));
            }
            signal.hits.entry = true;
            Ok(outcome(signal, kind, price, true))
        }
        StatusKind::StopLossHit => {
            if signal.hits.stop_loss {
                return Err(LifecycleError::AlreadyRecorded("stop loss".to_string()));
            }
            signal.hits.stop_loss = true;
            Ok(outcome(signal, kind, price, true))
        }
        StatusKind::TakeProfitHit(n) => {
            let slot = usize::from(n)
                .checked_sub(1)
                .filter(|idx| *idx < signal.take_profits.len())
                .ok_or_else(|| {
                    LifecycleError::InvalidFormat(format!("tp {} is not configured", n))
                })?;
            if signal.hits.take_profits[slot] {
                return Err(LifecycleError::AlreadyRecorded(format!("tp {}", n)));
            }
            signal.hits.take_profits[slot] = true;
            let closes = match policy {
                ClosePolicy::EveryHit => true,
                ClosePolicy::Terminal => slot + 1 == signal.take_profits.len(),
            };
            Ok(outcome(signal, kind, price, closes))
        }
    }
}

/// Realized movement as a signed multiple of the initial risk distance.
///
/// A zero entry-to-stop distance falls back to 1.0 so the division is always
/// defined. Positive means favorable movement relative to the direction,
/// regardless of which status kind triggered the fill.
pub fn risk_multiple(direction: Direction, entry: f64, stop_loss: f64, price: f64) -> f64 {
    price_delta(direction, entry, price) / risk_distance(entry, stop_loss)
}

/// Direction-aware raw price delta of a fill
pub fn price_delta(direction: Direction, entry: f64, price: f64) -> f64 {
    match direction {
        Direction::Buy => price - entry,
        Direction::Sell => entry - price,
    }
}

fn risk_distance(entry: f64, stop_loss: f64) -> f64 {
    let distance = (entry - stop_loss).abs();
    if distance == 0.0 {
        1.0
    } else {
        distance
    }
}

fn outcome(signal: &Signal, kind: StatusKind, price: Option<f64>, closes: bool) -> StatusOutcome {
    let record = price.map(|fill| JournalRecord {
        signal_id: signal.id.clone(),
        direction: signal.direction,
        symbol: signal.symbol.clone(),
        entry: signal.entry,
        stop_loss: signal.stop_loss,
        action: kind,
        price: fill,
        risk_multiple: risk_multiple(signal.direction, signal.entry, signal.stop_loss, fill),
        profit_price_units: price_delta(signal.direction, signal.entry, fill),
        timestamp: Utc::now(),
    });

    StatusOutcome {
        kind,
        price,
        closes,
        record,
    }
}
