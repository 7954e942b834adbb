//! Integration tests for the bot's command and status flows
//!
//! Drives `handlers::handle_message` end-to-end against a mocked Bot API and
//! a temp-file state document.

#[path = "test_utils.rs"]
mod test_utils;

use signalpost::handlers::handle_message;
use signalpost::models::Direction;
use signalpost::signals::lifecycle::create_signal;
use test_utils::*;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

const GOLD: &str = "/buy XAUUSD,4118,4115,4120,4122,4124,4126,4128";

#[tokio::test]
async fn buy_command_posts_pins_and_fans_out() {
    let mut bot = TestBot::new().await;
    handle_message(&bot.ctx, &mut bot.state, &private_message(OWNER_ID, GOLD)).await;

    assert_eq!(bot.state.signals.len(), 1);
    let signal = &bot.state.signals.list()[0];
    assert_eq!(signal.symbol, "XAUUSD");
    assert_eq!(signal.direction, Direction::Buy);
    let posted = signal.posted.as_ref().expect("posted location recorded");
    assert_eq!(posted.chat, CHANNEL);
    assert_eq!(posted.message_id, POSTED_MESSAGE_ID);

    // Previous pins cleared, new post pinned
    assert_eq!(requests_to(&bot.telegram, "unpinAllChatMessages").await.len(), 1);
    let pins = requests_to(&bot.telegram, "pinChatMessage").await;
    assert_eq!(pins.len(), 1);
    assert!(body_text(&pins[0]).contains(&format!("\"message_id\":{}", POSTED_MESSAGE_ID)));

    // Channel post + two owner DMs + issuer ack
    let sends = requests_to(&bot.telegram, "sendMessage").await;
    assert_eq!(sends.len(), 4);
    let channel_post = sends
        .iter()
        .find(|r| body_text(r).contains("\"chat_id\":\"@signals\""))
        .expect("channel post");
    assert!(body_text(channel_post).contains("XAUUSD Buy Limit"));
    assert!(body_text(channel_post).contains("Signal ID:"));

    for owner in [OWNER_ID, SECOND_OWNER_ID] {
        assert!(
            sends.iter().any(|r| {
                let body = body_text(r);
                body.contains(&format!("\"chat_id\":\"{}\"", owner))
                    && body.contains("New signal posted:")
            }),
            "owner {} should receive a DM copy",
            owner
        );
    }

    assert!(last_reply(&bot.telegram).await.contains("Signal posted (ID:"));

    // The signal was persisted before the ack
    let persisted = bot.ctx.backend.load().await.expect("state loads");
    assert_eq!(persisted.signals.len(), 1);
}

#[tokio::test]
async fn buy_command_as_photo_caption_posts_photo() {
    let mut bot = TestBot::new().await;
    let message = photo_message(OWNER_ID, "/buy XAUUSD,4118,4115", "chart-large");
    handle_message(&bot.ctx, &mut bot.state, &message).await;

    assert_eq!(bot.state.signals.len(), 1);
    let photos = requests_to(&bot.telegram, "sendPhoto").await;
    assert_eq!(photos.len(), 1);
    let body = body_text(&photos[0]);
    // Largest resolution wins, formatted text rides along as the caption
    assert!(body.contains("\"photo\":\"chart-large\""));
    assert!(body.contains("Signal ID:"));
}

#[tokio::test]
async fn malformed_buy_command_changes_nothing() {
    let mut bot = TestBot::new().await;
    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_message(OWNER_ID, "/buy XAUUSD,4118"),
    )
    .await;

    assert!(bot.state.signals.is_empty());
    assert!(requests_to(&bot.telegram, "pinChatMessage").await.is_empty());
    let sends = requests_to(&bot.telegram, "sendMessage").await;
    assert_eq!(sends.len(), 1);
    assert!(body_text(&sends[0]).contains("Invalid format"));

    // Nothing was written to disk either
    let persisted = bot.ctx.backend.load().await.expect("state loads");
    assert!(persisted.signals.is_empty());
}

#[tokio::test]
async fn non_owner_commands_get_fixed_denial() {
    let mut bot = TestBot::new().await;
    handle_message(&bot.ctx, &mut bot.state, &private_message(9999, GOLD)).await;

    assert!(bot.state.signals.is_empty());
    let sends = requests_to(&bot.telegram, "sendMessage").await;
    assert_eq!(sends.len(), 1);
    assert!(body_text(&sends[0]).contains("You are not an owner."));
}

#[tokio::test]
async fn status_reply_announces_and_journals() {
    let mut bot = TestBot::new().await;
    handle_message(&bot.ctx, &mut bot.state, &private_message(OWNER_ID, GOLD)).await;
    let id = bot.state.signals.list()[0].id.clone();
    let dm_copy = format!("New signal posted:\n\nXAUUSD Buy Limit\n\nSignal ID: {}", id);

    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_reply(OWNER_ID, "tp1 4120", &dm_copy),
    )
    .await;

    // Intermediate take-profit: flagged, journaled, still live
    let signal = bot.state.signals.get(&id).expect("still live");
    assert!(signal.hits.take_profits[0]);
    let today = bot.ctx.today();
    let records = bot.state.journal.for_date(&today);
    assert_eq!(records.len(), 1);
    assert!((records[0].risk_multiple - 2.0 / 3.0).abs() < 1e-9);

    // Announcement is threaded under the pinned post
    let sends = requests_to(&bot.telegram, "sendMessage").await;
    let announcement = sends
        .iter()
        .find(|r| body_text(r).contains("Tp 1 ✅"))
        .expect("channel announcement");
    let body = body_text(announcement);
    assert!(body.contains(&format!("\"reply_to_message_id\":{}", POSTED_MESSAGE_ID)));
    assert!(body.contains("Price: 4120"));

    // Stop-loss fill at 4115 is -1R and closes the signal
    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_reply(OWNER_ID, "sl 4115", &dm_copy),
    )
    .await;
    assert!(bot.state.signals.get(&id).is_none());
    let records = bot.state.journal.for_date(&today);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].risk_multiple, -1.0);

    // Removal and journal both survived persistence
    let persisted = bot.ctx.backend.load().await.expect("state loads");
    assert!(persisted.signals.is_empty());
    assert_eq!(persisted.journal.for_date(&today).len(), 2);
}

#[tokio::test]
async fn duplicate_status_is_reported_not_reannounced() {
    let mut bot = TestBot::new().await;
    handle_message(&bot.ctx, &mut bot.state, &private_message(OWNER_ID, GOLD)).await;
    let id = bot.state.signals.list()[0].id.clone();
    let dm_copy = format!("Signal ID: {}", id);

    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_reply(OWNER_ID, "tp1 4120", &dm_copy),
    )
    .await;
    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_reply(OWNER_ID, "tp1 4121", &dm_copy),
    )
    .await;

    // One announcement, one journal record, and a typed rejection for the repeat
    let sends = requests_to(&bot.telegram, "sendMessage").await;
    let announcements = sends.iter().filter(|r| body_text(r).contains("Tp 1 ✅")).count();
    assert_eq!(announcements, 1);
    assert_eq!(bot.state.journal.for_date(&bot.ctx.today()).len(), 1);
    assert!(last_reply(&bot.telegram).await.contains("tp 1 already recorded"));
}

#[tokio::test]
async fn cancel_removes_without_journal() {
    let mut bot = TestBot::new().await;
    handle_message(&bot.ctx, &mut bot.state, &private_message(OWNER_ID, GOLD)).await;
    let id = bot.state.signals.list()[0].id.clone();

    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_reply(OWNER_ID, "cancel", &format!("Signal ID: {}", id)),
    )
    .await;

    assert!(bot.state.signals.get(&id).is_none());
    assert!(bot.state.journal.for_date(&bot.ctx.today()).is_empty());

    let sends = requests_to(&bot.telegram, "sendMessage").await;
    assert!(sends.iter().any(|r| body_text(r).contains("❌ Cancel")));
    assert!(last_reply(&bot.telegram).await.contains("Signal cancelled."));
}

#[tokio::test]
async fn status_reply_with_unknown_id_reports_not_found() {
    let mut bot = TestBot::new().await;
    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_reply(OWNER_ID, "hit", "Signal ID: doesnotexist1"),
    )
    .await;
    assert!(last_reply(&bot.telegram).await.contains("Signal not found."));
}

#[tokio::test]
async fn status_reply_without_marker_is_reported() {
    let mut bot = TestBot::new().await;
    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_reply(OWNER_ID, "hit", "just some text"),
    )
    .await;
    assert!(last_reply(&bot.telegram).await.contains("No Signal ID found"));
}

#[tokio::test]
async fn non_owner_status_reply_is_silently_ignored() {
    let mut bot = TestBot::new().await;
    let signal = create_signal(Direction::Buy, "XAUUSD", 4118.0, 4115.0, vec![Some(4120.0)])
        .expect("valid signal");
    let id = signal.id.clone();
    bot.state.signals.insert(signal);

    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_reply(9999, "tp1 4120", &format!("Signal ID: {}", id)),
    )
    .await;

    // No reply, no announcement, no state change
    assert!(requests_to(&bot.telegram, "sendMessage").await.is_empty());
    let signal = bot.state.signals.get(&id).expect("unchanged");
    assert!(!signal.hits.take_profits[0]);
}

#[tokio::test]
async fn owner_fanout_continues_past_delivery_failure() {
    let bot = TestBot::bare().await;
    // DMs to the first owner fail; everything else succeeds
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .and(body_string_contains(&format!("\"chat_id\":\"{}\"", OWNER_ID)))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&bot.telegram)
        .await;
    mock_send_message(&bot.telegram).await;
    mock_send_photo(&bot.telegram).await;
    mock_pin_and_unpin(&bot.telegram).await;

    let mut bot = bot;
    handle_message(&bot.ctx, &mut bot.state, &private_message(OWNER_ID, GOLD)).await;

    // The failed DM neither aborted the fan-out nor rolled back the signal
    assert_eq!(bot.state.signals.len(), 1);
    let sends = requests_to(&bot.telegram, "sendMessage").await;
    assert!(sends.iter().any(|r| {
        let body = body_text(r);
        body.contains(&format!("\"chat_id\":\"{}\"", SECOND_OWNER_ID))
            && body.contains("New signal posted:")
    }));
}

#[tokio::test]
async fn journal_command_renders_day() {
    let mut bot = TestBot::new().await;
    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_message(OWNER_ID, "/journal"),
    )
    .await;
    assert!(last_reply(&bot.telegram).await.contains("No journal entries for"));

    handle_message(&bot.ctx, &mut bot.state, &private_message(OWNER_ID, GOLD)).await;
    let id = bot.state.signals.list()[0].id.clone();
    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_reply(OWNER_ID, "tp1 4120", &format!("Signal ID: {}", id)),
    )
    .await;

    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_message(OWNER_ID, "/journal"),
    )
    .await;
    let reply = last_reply(&bot.telegram).await;
    assert!(reply.contains("XAUUSD TP1"));
    assert!(reply.contains("Total:"));
}

#[tokio::test]
async fn owner_management_round_trip() {
    let mut bot = TestBot::new().await;

    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_message(OWNER_ID, "/addowner 2002"),
    )
    .await;
    assert!(bot.state.owners.contains(2002));
    assert!(last_reply(&bot.telegram).await.contains("Owner added."));

    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_message(OWNER_ID, "/addowner 2002"),
    )
    .await;
    assert!(last_reply(&bot.telegram).await.contains("Owner already exists."));

    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_message(OWNER_ID, "/removeowner 3003"),
    )
    .await;
    assert!(last_reply(&bot.telegram).await.contains("Owner not found."));

    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_message(OWNER_ID, "/addowner"),
    )
    .await;
    assert!(last_reply(&bot.telegram).await.contains("Usage: /addowner"));

    handle_message(
        &bot.ctx,
        &mut bot.state,
        &private_message(OWNER_ID, "/owners"),
    )
    .await;
    let listing = last_reply(&bot.telegram).await;
    assert!(listing.contains("1001"));
    assert!(listing.contains("2002"));

    // The new owner list was persisted
    let persisted = bot.ctx.backend.load().await.expect("state loads");
    assert!(persisted.owners.contains(2002));
}
