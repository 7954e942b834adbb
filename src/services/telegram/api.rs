//! Minimal Telegram Bot API client: long polling in, message delivery out.

use crate::services::telegram::types::{
    ApiResponse, ChatIdPayload, GetUpdatesPayload, Message, PinMessagePayload, SendMessagePayload,
    SendPhotoPayload, Update,
};
use crate::services::transport::{MessageRef, Transport, TransportError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Thin reqwest client over the Bot API.
///
/// The base URL is injectable so tests can point the client at a mock server.
pub struct TelegramApi {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl TelegramApi {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_client(
            TELEGRAM_API_BASE.to_string(),
            token,
            reqwest::Client::new(),
        )
    }

    pub fn with_client(
        base_url: String,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url,
            token: token.into(),
            client,
        }
    }

    /// Long-poll for inbound updates starting at `offset`
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let payload = GetUpdatesPayload {
            offset,
            timeout: timeout_secs,
        };
        let updates: Vec<Update> = self.call("getUpdates", &payload).await?;
        if !updates.is_empty() {
            debug!(count = updates.len(), "received {} updates", updates.len());
        }
        Ok(updates)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<T, P>(&self, method: &str, payload: &P) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Api(format!("{}: {}", method, body)));
        }

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !envelope.ok {
            return Err(TransportError::Api(format!(
                "{}: {}",
                method,
                envelope.description.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        envelope
            .result
            .ok_or_else(|| TransportError::Api(format!("{}: missing result", method)))
    }
}

#[async_trait]
impl Transport for TelegramApi {
    async fn send_message(
        &self,
        dest: &str,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<MessageRef, TransportError> {
        let payload = SendMessagePayload {
            chat_id: dest,
            text,
            reply_to_message_id: reply_to,
        };
        let message: Message = self.call("sendMessage", &payload).await?;
        Ok(MessageRef {
            chat: dest.to_string(),
            message_id: message.message_id,
        })
    }

    async fn send_photo(
        &self,
        dest: &str,
        file_id: &str,
        caption: &str,
        reply_to: Option<i64>,
    ) -> Result<MessageRef, TransportError> {
        let payload = SendPhotoPayload {
            chat_id: dest,
            photo: file_id,
            caption,
            reply_to_message_id: reply_to,
        };
        let message: Message = self.call("sendPhoto", &payload).await?;
        Ok(MessageRef {
            chat: dest.to_string(),
            message_id: message.message_id,
        })
    }

    async fn pin_message(&self, dest: &str, message_id: i64) -> Result<(), TransportError> {
        let payload = PinMessagePayload {
            chat_id: dest,
            message_id,
        };
        let _: bool = self.call("pinChatMessage", &payload).await?;
        Ok(())
    }

    async fn unpin_all(&self, dest: &str) -> Result<(), TransportError> {
        let payload = ChatIdPayload { chat_id: dest };
        let _: bool = self.call("unpinAllChatMessages", &payload).await?;
        Ok(())
    }
}
