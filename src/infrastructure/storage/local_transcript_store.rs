use std::path::PathBuf;

use async_trait::async_trait;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{TranscriptStore, TranscriptStoreError};
use crate::domain::StoragePath;

/// Writes finished transcripts as UTF-8 text files under the transcripts dir.
pub struct LocalTranscriptStore {
    inner: LocalFileSystem,
    base_path: PathBuf,
}

impl LocalTranscriptStore {
    pub fn new(base_path: PathBuf) -> Result<Self, TranscriptStoreError> {
        std::fs::create_dir_all(&base_path)?;
        let inner = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| TranscriptStoreError::WriteFailed(e.to_string()))?;
        Ok(Self { inner, base_path })
    }

    pub fn resolve(&self, path: &StoragePath) -> PathBuf {
        self.base_path.join(path.as_str())
    }
}

#[async_trait]
impl TranscriptStore for LocalTranscriptStore {
    async fn save(&self, path: &StoragePath, transcript: &str) -> Result<(), TranscriptStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .put(&store_path, PutPayload::from(transcript.as_bytes().to_vec()))
            .await
            .map_err(|e| TranscriptStoreError::WriteFailed(e.to_string()))?;

        tracing::debug!(path = %self.resolve(path).display(), "Transcript written");
        Ok(())
    }
}
