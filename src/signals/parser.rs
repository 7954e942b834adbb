//! Inbound text parsing: signal commands, status updates and the
//! `Signal ID:` trailer recovery.

use crate::models::signal::StatusKind;
use crate::signals::format::SIGNAL_ID_PREFIX;
use crate::signals::lifecycle::{LifecycleError, MAX_TAKE_PROFITS};

/// Raw fields of a `/buy` or `/sell` command body
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSignal {
    pub symbol: String,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profits: Vec<Option<f64>>,
}

/// A parsed owner status reply
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedStatus {
    pub kind: StatusKind,
    pub price: Option<f64>,
}

/// Parse the body of a `/buy`//`sell` command.
///
/// The command token is stripped, all whitespace removed, and the remainder
/// split on commas: `SYMBOL,entry,stoploss[,tp1..tp5]`. Empty take-profit
/// fields become unset slots; fields beyond the fifth take-profit are ignored.
pub fn parse_signal_command(text: &str) -> Result<ParsedSignal, LifecycleError> {
    let trimmed = text.trim();
    let rest = strip_command_token(trimmed);

    let cleaned: String = rest.split_whitespace().collect();
    let parts: Vec<&str> = cleaned.split(',').collect();
    if parts.len() < 3 || parts[0].is_empty() {
        return Err(LifecycleError::InvalidFormat(
            "expected symbol,entry,stoploss[,tp1..tp5]".to_string(),
        ));
    }

    let symbol = parts[0].to_string();
    let entry = parse_price(parts[1])?;
    let stop_loss = parse_price(parts[2])?;
    let take_profits = parts[3..]
        .iter()
        .take(MAX_TAKE_PROFITS)
        .map(|field| {
            if field.is_empty() {
                Ok(None)
            } else {
                parse_price(field).map(Some)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedSignal {
        symbol,
        entry,
        stop_loss,
        take_profits,
    })
}

/// Parse an owner status reply: `hit`, `sl`, `tp1`..`tp5` or `cancel`,
/// optionally followed by the fill price.
pub fn parse_status_command(text: &str) -> Result<ParsedStatus, LifecycleError> {
    let lower = text.trim().to_lowercase();
    let mut parts = lower.split_whitespace();
    let command = parts.next().ok_or_else(|| {
        LifecycleError::InvalidFormat("empty status command".to_string())
    })?;

    let kind = match command {
        "hit" => StatusKind::EntryHit,
        "sl" => StatusKind::StopLossHit,
        "cancel" => StatusKind::Cancel,
        tp if tp.starts_with("tp") => {
            let slot: u8 = tp[2..].parse().map_err(|_| unknown_status(command))?;
            if slot < 1 || slot as usize > MAX_TAKE_PROFITS {
                return Err(unknown_status(command));
            }
            StatusKind::TakeProfitHit(slot)
        }
        _ => return Err(unknown_status(command)),
    };

    // An unparseable price token is treated as absent, like the rest of a
    // free-form reply ("tp1 screenshot attached").
    let price = parts
        .next()
        .and_then(|p| p.parse::<f64>().ok())
        .filter(|p| p.is_finite());

    Ok(ParsedStatus { kind, price })
}

/// Recover a signal id from posted message text.
///
/// Scans for the last literal `Signal ID:` prefix and returns the
/// alphanumeric token after it. This is a strict prefix match on the exact
/// bytes the formatter emits, not a loose pattern.
pub fn extract_signal_id(text: &str) -> Option<String> {
    let position = text.rfind(SIGNAL_ID_PREFIX)?;
    let rest = text[position + SIGNAL_ID_PREFIX.len()..].trim_start();
    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

fn strip_command_token(text: &str) -> &str {
    let lower = text.to_lowercase();
    for token in ["/buy", "/sell"] {
        if lower.starts_with(token) {
            let rest = &text[token.len()..];
            // Commands addressed as /buy@BotName carry the mention too
            if rest.starts_with('@') {
                return rest
                    .split_once(char::is_whitespace)
                    .map(|(_, body)| body)
                    .unwrap_or("");
            }
            return rest;
        }
    }
    text
}

fn parse_price(field: &str) -> Result<f64, LifecycleError> {
    field
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| LifecycleError::InvalidFormat(format!("not a number: {}", field)))
}

fn unknown_status(command: &str) -> LifecycleError {
    LifecycleError::InvalidFormat(format!(
        "unknown status command: {} (expected hit, sl, tp1..tp5 or cancel)",
        command
    ))
}
