//! Durable whole-document persistence for the bot state.

pub mod file;

pub use file::JsonFileBackend;

use crate::store::BotState;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Whole-document load/save of the aggregate state.
///
/// Not transactional: every save rewrites the complete document. The runtime
/// awaits `save` after each mutating operation before acknowledging it, which
/// gives at-most-once durability: an acknowledged operation survives a
/// crash, an in-flight one may not.
#[async_trait]
pub trait StateBackend: Send + Sync {
    async fn load(&self) -> Result<BotState, StoreError>;
    async fn save(&self, state: &BotState) -> Result<(), StoreError>;
}
