//! Messaging transport interface for channel posts and owner fan-out.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("api error: {0}")]
    Api(String),
}

/// Handle to a delivered message, used for pinning and threaded replies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: String,
    pub message_id: i64,
}

/// Outbound message delivery.
///
/// Every call may fail independently; callers treat failures as per-recipient
/// events: logged, never a reason to abort a fan-out loop.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(
        &self,
        dest: &str,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<MessageRef, TransportError>;

    async fn send_photo(
        &self,
        dest: &str,
        file_id: &str,
        caption: &str,
        reply_to: Option<i64>,
    ) -> Result<MessageRef, TransportError>;

    async fn pin_message(&self, dest: &str, message_id: i64) -> Result<(), TransportError>;

    async fn unpin_all(&self, dest: &str) -> Result<(), TransportError>;
}
