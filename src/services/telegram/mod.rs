//! Telegram Bot API implementation of the messaging transport.

pub mod api;
pub mod types;

pub use api::{TelegramApi, TELEGRAM_API_BASE};
pub use types::{Chat, Message, PhotoSize, Update, User};
