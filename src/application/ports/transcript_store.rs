use async_trait::async_trait;

use crate::domain::StoragePath;

/// Durable sink for finished transcripts.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn save(&self, path: &StoragePath, transcript: &str) -> Result<(), TranscriptStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptStoreError {
    #[error("transcript write failed: {0}")]
    WriteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
