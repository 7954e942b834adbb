//! Status updates: owner replies that mutate a live signal.

use crate::handlers::BotContext;
use crate::models::StatusKind;
use crate::services::telegram::Message;
use crate::signals::lifecycle::{self, LifecycleError, StatusOutcome};
use crate::signals::{format, parser};
use crate::store::BotState;
use tracing::{debug, error, info};

const USAGE_STATUS: &str =
    "Commands: hit, sl, tp1..tp5, cancel (optionally followed by the fill price)";

/// Handle a private-chat reply carrying a status update.
///
/// The referenced signal is recovered from the `Signal ID:` trailer of the
/// replied-to message. Transitions are applied at most once; the journal
/// append, store removal and persistence all complete before the channel
/// announcement, so a failed announcement never rolls anything back.
pub async fn handle_status_reply(ctx: &BotContext, state: &mut BotState, message: &Message) {
    // Strangers' DMs get no acknowledgement at all
    if !super::is_owner(state, message) {
        debug!(chat = message.chat.id, "ignoring private message from non-owner");
        return;
    }

    let Some(replied) = message.reply_to_message.as_deref() else {
        return;
    };
    let combined = format!(
        "{}\n{}",
        replied.text.as_deref().unwrap_or(""),
        replied.caption.as_deref().unwrap_or("")
    );
    let Some(id) = parser::extract_signal_id(&combined) else {
        super::reply(ctx, message, "No Signal ID found in the replied message.").await;
        return;
    };

    let Some(text) = message.command_text() else {
        super::reply(ctx, message, USAGE_STATUS).await;
        return;
    };
    let parsed = match parser::parse_status_command(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(id = %id, error = %e, "rejected status command");
            super::reply(ctx, message, USAGE_STATUS).await;
            return;
        }
    };

    let Some(signal) = state.signals.get_mut(&id) else {
        super::reply(ctx, message, "Signal not found.").await;
        return;
    };

    let outcome = match lifecycle::apply_status(signal, parsed.kind, parsed.price, ctx.close_policy)
    {
        Ok(outcome) => outcome,
        Err(e @ LifecycleError::AlreadyRecorded(_)) => {
            // Typed duplicate guard: report it, announce nothing downstream
            super::reply(ctx, message, &format!("{}.", e)).await;
            return;
        }
        Err(e) => {
            super::reply(ctx, message, &e.to_string()).await;
            return;
        }
    };

    let posted = signal.posted.clone();
    let StatusOutcome {
        kind,
        price,
        closes,
        record,
    } = outcome;

    if let Some(record) = record {
        state.journal.append(&ctx.today(), record);
    }
    if closes {
        state.signals.remove(&id);
    }

    if let Err(e) = ctx.backend.save(state).await {
        error!(id = %id, error = %e, "failed to persist state after status update");
        super::reply(ctx, message, "Status recorded but could not be saved.").await;
        return;
    }

    let announcement = format::render_status(kind, price, &id);
    let (dest, reply_to) = match &posted {
        Some(p) => (p.chat.as_str(), Some(p.message_id)),
        None => (ctx.channel.as_str(), None),
    };
    let delivery = match message.largest_photo() {
        Some(photo) => {
            ctx.transport
                .send_photo(dest, &photo.file_id, &announcement, reply_to)
                .await
        }
        None => ctx.transport.send_message(dest, &announcement, reply_to).await,
    };

    info!(id = %id, kind = ?kind, closed = closes, "status applied to signal {}", id);
    match delivery {
        Ok(_) => {
            let ack = if kind == StatusKind::Cancel {
                "Signal cancelled."
            } else {
                "Status sent to the channel."
            };
            super::reply(ctx, message, ack).await;
        }
        Err(e) => {
            error!(id = %id, error = %e, "failed to announce status to channel");
            super::reply(
                ctx,
                message,
                "Status recorded, but announcing it to the channel failed.",
            )
            .await;
        }
    }
}
