//! JSON file implementation of the durable state backend.

use crate::db::{StateBackend, StoreError};
use crate::store::BotState;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persists the whole state document as pretty-printed JSON at a fixed path.
///
/// Saves go through a sibling temp file and an atomic rename, so a crash
/// mid-write leaves the previous document intact rather than a torn one.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl StateBackend for JsonFileBackend {
    /// A missing file is a fresh deployment, not an error
    async fn load(&self) -> Result<BotState, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "state file missing, starting empty");
                Ok(BotState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, state: &BotState) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
