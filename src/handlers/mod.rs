//! Inbound message handling: command dispatch and status replies.

pub mod commands;
pub mod context;
pub mod status;

pub use context::BotContext;

use crate::services::telegram::Message;
use crate::store::BotState;
use tracing::warn;

/// Fixed denial sent to non-owners invoking owner-only commands
pub const OWNERS_ONLY: &str = "You are not an owner.";

/// Route one inbound message.
///
/// Slash commands are handled wherever they arrive; status updates are only
/// accepted as private-chat replies to a previously fanned-out copy.
pub async fn handle_message(ctx: &BotContext, state: &mut BotState, message: &Message) {
    if let Some(text) = message.command_text() {
        if text.starts_with('/') {
            let token = text.split_whitespace().next().unwrap_or("");
            // Commands in groups may be addressed as /buy@BotName
            let command = token.split('@').next().unwrap_or(token).to_lowercase();
            match command.as_str() {
                "/buy" => {
                    return commands::handle_new_signal(
                        ctx,
                        state,
                        message,
                        crate::models::Direction::Buy,
                    )
                    .await;
                }
                "/sell" => {
                    return commands::handle_new_signal(
                        ctx,
                        state,
                        message,
                        crate::models::Direction::Sell,
                    )
                    .await;
                }
                "/owners" => return commands::handle_owners(ctx, state, message).await,
                "/addowner" => return commands::handle_add_owner(ctx, state, message).await,
                "/removeowner" => return commands::handle_remove_owner(ctx, state, message).await,
                "/journal" => return commands::handle_journal(ctx, state, message).await,
                _ => {}
            }
        }
    }

    if message.is_private() && message.reply_to_message.is_some() {
        status::handle_status_reply(ctx, state, message).await;
    }
}

/// Best-effort reply to the message's chat; delivery failures are logged only
pub(crate) async fn reply(ctx: &BotContext, message: &Message, text: &str) {
    let chat = message.chat.id.to_string();
    if let Err(e) = ctx.transport.send_message(&chat, text, None).await {
        warn!(chat = %chat, error = %e, "failed to deliver reply to {}", chat);
    }
}

/// Whether the message sender is on the owner allow-list
pub(crate) fn is_owner(state: &BotState, message: &Message) -> bool {
    message
        .sender_id()
        .map(|id| state.owners.contains(id))
        .unwrap_or(false)
}
