//! Owner-gated bot commands: signal creation, owner management, journal recall.

use crate::handlers::BotContext;
use crate::models::signal::PostedMessage;
use crate::models::Direction;
use crate::services::telegram::Message;
use crate::signals::{format, lifecycle, parser};
use crate::store::BotState;
use tracing::{debug, error, info, warn};

const USAGE_NEW_SIGNAL: &str = "Invalid format.\nExample:\n/buy XAUUSD,4118,4115,4120,4122,4124,4126,4128\n(may be sent as a photo caption)";
const USAGE_ADD_OWNER: &str = "Usage: /addowner <subscriber_id>";
const USAGE_REMOVE_OWNER: &str = "Usage: /removeowner <subscriber_id>";

/// `/buy` and `/sell`: parse, post to the channel, pin, fan out, persist.
///
/// Order matters: the channel post happens before the store insert, so a
/// failed post changes no state; persistence completes before the issuer is
/// acked; owner DMs are best effort per recipient.
pub async fn handle_new_signal(
    ctx: &BotContext,
    state: &mut BotState,
    message: &Message,
    direction: Direction,
) {
    if !gate(ctx, state, message).await {
        return;
    }

    let Some(text) = message.command_text() else {
        super::reply(ctx, message, USAGE_NEW_SIGNAL).await;
        return;
    };
    let parsed = match parser::parse_signal_command(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "rejected signal command");
            super::reply(ctx, message, USAGE_NEW_SIGNAL).await;
            return;
        }
    };

    let mut signal = match lifecycle::create_signal(
        direction,
        &parsed.symbol,
        parsed.entry,
        parsed.stop_loss,
        parsed.take_profits,
    ) {
        Ok(signal) => signal,
        Err(e) => {
            super::reply(ctx, message, &e.to_string()).await;
            return;
        }
    };

    let post_text = format::render_signal(&signal);

    // Stale pins from earlier signals are cleared best-effort
    if let Err(e) = ctx.transport.unpin_all(&ctx.channel).await {
        warn!(channel = %ctx.channel, error = %e, "failed to unpin previous channel messages");
    }

    let posted = match message.largest_photo() {
        Some(photo) => {
            ctx.transport
                .send_photo(&ctx.channel, &photo.file_id, &post_text, None)
                .await
        }
        None => {
            ctx.transport
                .send_message(&ctx.channel, &post_text, None)
                .await
        }
    };
    let posted = match posted {
        Ok(posted) => posted,
        Err(e) => {
            error!(channel = %ctx.channel, error = %e, "failed to post signal to channel");
            super::reply(ctx, message, "Failed to post the signal to the channel.").await;
            return;
        }
    };

    if let Err(e) = ctx
        .transport
        .pin_message(&posted.chat, posted.message_id)
        .await
    {
        warn!(message_id = posted.message_id, error = %e, "failed to pin signal post");
    }

    signal.posted = Some(PostedMessage {
        chat: posted.chat,
        message_id: posted.message_id,
    });
    let id = signal.id.clone();
    let symbol = signal.symbol.clone();
    state.signals.insert(signal);

    if let Err(e) = ctx.backend.save(state).await {
        error!(id = %id, error = %e, "failed to persist state after new signal");
        super::reply(ctx, message, "Posted, but saving the signal failed.").await;
        return;
    }

    let owner_text = format!("New signal posted:\n\n{}", post_text);
    for owner in state.owners.list() {
        if let Err(e) = ctx
            .transport
            .send_message(&owner.to_string(), &owner_text, None)
            .await
        {
            warn!(owner = owner, error = %e, "failed to DM owner {}", owner);
        }
    }

    info!(id = %id, symbol = %symbol, direction = ?direction, "signal {} posted", id);
    super::reply(ctx, message, &format!("Signal posted (ID: {})", id)).await;
}

/// `/owners`: list the current allow-list
pub async fn handle_owners(
    ctx: &BotContext,
    state: &mut BotState,
    message: &Message,
) {
    if !gate(ctx, state, message).await {
        return;
    }
    let listing = state
        .owners
        .list()
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    super::reply(ctx, message, &format!("Owners:\n{}", listing)).await;
}

/// `/addowner <id>`: extend the allow-list; duplicates are reported, not added
pub async fn handle_add_owner(
    ctx: &BotContext,
    state: &mut BotState,
    message: &Message,
) {
    if !gate(ctx, state, message).await {
        return;
    }
    let Some(id) = owner_argument(message) else {
        super::reply(ctx, message, USAGE_ADD_OWNER).await;
        return;
    };

    if !state.owners.add(id) {
        super::reply(ctx, message, "Owner already exists.").await;
        return;
    }
    if let Err(e) = ctx.backend.save(state).await {
        error!(owner = id, error = %e, "failed to persist owner list");
        super::reply(ctx, message, "Failed to save the owner list.").await;
        return;
    }
    info!(owner = id, "owner {} added", id);
    super::reply(ctx, message, "Owner added.").await;
}

/// `/removeowner <id>`: shrink the allow-list; unknown ids are reported
pub async fn handle_remove_owner(
    ctx: &BotContext,
    state: &mut BotState,
    message: &Message,
) {
    if !gate(ctx, state, message).await {
        return;
    }
    let Some(id) = owner_argument(message) else {
        super::reply(ctx, message, USAGE_REMOVE_OWNER).await;
        return;
    };

    if !state.owners.remove(id) {
        super::reply(ctx, message, "Owner not found.").await;
        return;
    }
    if let Err(e) = ctx.backend.save(state).await {
        error!(owner = id, error = %e, "failed to persist owner list");
        super::reply(ctx, message, "Failed to save the owner list.").await;
        return;
    }
    info!(owner = id, "owner {} removed", id);
    super::reply(ctx, message, "Owner removed.").await;
}

/// `/journal [YYYY-MM-DD]`: render one day's journal, defaulting to today
pub async fn handle_journal(
    ctx: &BotContext,
    state: &mut BotState,
    message: &Message,
) {
    if !gate(ctx, state, message).await {
        return;
    }
    let date = message
        .command_text()
        .and_then(|t| t.split_whitespace().nth(1))
        .map(str::to_string)
        .unwrap_or_else(|| ctx.today());

    let summary = state.journal.summarize(&date);
    let text = format::render_journal(&date, state.journal.for_date(&date), &summary);
    super::reply(ctx, message, &text).await;
}

async fn gate(
    ctx: &BotContext,
    state: &BotState,
    message: &Message,
) -> bool {
    if super::is_owner(state, message) {
        return true;
    }
    super::reply(ctx, message, super::OWNERS_ONLY).await;
    false
}

fn owner_argument(message: &Message) -> Option<i64> {
    message
        .command_text()
        .and_then(|t| t.split_whitespace().nth(1))
        .and_then(|arg| arg.parse::<i64>().ok())
}
