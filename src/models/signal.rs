use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Buy => "Buy",
            Direction::Sell => "Sell",
        }
    }
}

/// A status update applied to a live signal.
///
/// Take-profit slots are numbered 1..=5 as the operator types them
/// (`tp1`..`tp5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Cancel,
    EntryHit,
    StopLossHit,
    TakeProfitHit(u8),
}

impl StatusKind {
    /// Short uppercase tag used in journal lines ("HIT", "SL", "TP3")
    pub fn tag(&self) -> String {
        match self {
            StatusKind::Cancel => "CANCEL".to_string(),
            StatusKind::EntryHit => "HIT".to_string(),
            StatusKind::StopLossHit => "SL".to_string(),
            StatusKind::TakeProfitHit(n) => format!("TP{}", n),
        }
    }
}

/// Where a signal ended up in the broadcast channel once posted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMessage {
    pub chat: String,
    pub message_id: i64,
}

/// Per-signal one-shot status flags.
///
/// Each flag transitions false -> true at most once and never resets;
/// `take_profits` is parallel to the signal's configured take-profit slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlags {
    pub entry: bool,
    pub stop_loss: bool,
    pub take_profits: Vec<bool>,
}

/// One posted trade idea, alive until a closing status removes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub direction: Direction,
    pub symbol: String,
    pub entry: f64,
    pub stop_loss: f64,
    /// 0..=5 ordered take-profit slots; a slot may be present but unset
    pub take_profits: Vec<Option<f64>>,
    pub hits: StatusFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted: Option<PostedMessage>,
    pub created_at: DateTime<Utc>,
}
