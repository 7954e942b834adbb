//! Pure text rendering for channel posts, status announcements and journals.
//!
//! No side effects here; everything returns a `String` the transport layer
//! delivers verbatim.

use crate::models::journal::{JournalRecord, JournalSummary};
use crate::models::signal::{Signal, StatusKind};

/// Literal trailer prefix embedded in every posted message.
///
/// This is the wire contract between the formatter and the inbound status
/// parser and must stay byte-identical on both sides.
pub const SIGNAL_ID_PREFIX: &str = "Signal ID:";

/// Render a signal as its channel post.
///
/// One `Tp N:` line per configured slot (blank value for unset slots), then a
/// blank line and the `Signal ID:` trailer.
pub fn render_signal(signal: &Signal) -> String {
    let mut lines = Vec::with_capacity(signal.take_profits.len() + 5);
    lines.push(format!(
        "{} {} Limit",
        signal.symbol,
        signal.direction.label()
    ));
    lines.push(format!("Entry: {}", signal.entry));
    lines.push(format!("Stop loss: {}", signal.stop_loss));
    for (slot, tp) in signal.take_profits.iter().enumerate() {
        match tp {
            Some(price) => lines.push(format!("Tp {}: {}", slot + 1, price)),
            None => lines.push(format!("Tp {}: ", slot + 1)),
        }
    }
    lines.push(String::new());
    lines.push(format!("{} {}", SIGNAL_ID_PREFIX, signal.id));
    lines.join("\n")
}

/// Render a status announcement: short label, optional price line, id trailer
pub fn render_status(kind: StatusKind, price: Option<f64>, id: &str) -> String {
    let label = match kind {
        StatusKind::Cancel => "❌ Cancel".to_string(),
        StatusKind::EntryHit => "Hit ✅".to_string(),
        StatusKind::StopLossHit => "Stop Loss ❌".to_string(),
        StatusKind::TakeProfitHit(n) => format!("Tp {} ✅", n),
    };

    let mut lines = vec![label];
    if kind != StatusKind::Cancel {
        if let Some(fill) = price {
            lines.push(format!("Price: {}", fill));
        }
    }
    lines.push(format!("{} {}", SIGNAL_ID_PREFIX, id));
    lines.join("\n")
}

/// Render the journal for one day: a line per record plus a totals block
pub fn render_journal(date: &str, records: &[JournalRecord], summary: &JournalSummary) -> String {
    if records.is_empty() {
        return format!("No journal entries for {}", date);
    }

    let mut lines = Vec::with_capacity(records.len() + 4);
    lines.push(format!("Journal {}", date));
    lines.push(String::new());
    for record in records {
        lines.push(format!(
            "{} {} | {:+.2} R",
            record.symbol,
            record.action.tag(),
            record.risk_multiple
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "Total: {:+.2} R ({}W/{}L)",
        summary.total_r, summary.wins, summary.losses
    ));
    lines.push(format!("Price delta: {:+.2}", summary.total_price_delta));
    lines.join("\n")
}
