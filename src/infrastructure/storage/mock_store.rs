use std::collections::HashMap;
use std::io;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::Mutex;

use crate::application::ports::{
    StagingStore, StagingStoreError, TranscriptStore, TranscriptStoreError,
};
use crate::domain::StoragePath;

/// In-memory staging store for tests and scaffold runs.
#[derive(Default)]
pub struct MockStagingStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, path: &StoragePath) -> bool {
        self.objects.lock().await.contains_key(path.as_str())
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl StagingStore for MockStagingStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, StagingStoreError> {
        let mut data = Vec::new();
        while let Some(part) = stream.next().await {
            data.extend_from_slice(&part?);
        }
        let written = data.len() as u64;
        self.objects
            .lock()
            .await
            .insert(path.as_str().to_string(), data);
        Ok(written)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, StagingStoreError> {
        self.objects
            .lock()
            .await
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| StagingStoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        self.objects.lock().await.remove(path.as_str());
        Ok(())
    }
}

/// Records saved transcripts; can be told to fail every write.
#[derive(Default)]
pub struct MockTranscriptStore {
    saved: Mutex<Vec<(StoragePath, String)>>,
    fail_writes: bool,
}

impl MockTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail_writes: true,
        }
    }

    pub async fn saved(&self) -> Vec<(StoragePath, String)> {
        self.saved.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl TranscriptStore for MockTranscriptStore {
    async fn save(&self, path: &StoragePath, transcript: &str) -> Result<(), TranscriptStoreError> {
        if self.fail_writes {
            return Err(TranscriptStoreError::WriteFailed(format!(
                "mock store refused {}",
                path
            )));
        }
        self.saved
            .lock()
            .await
            .push((path.clone(), transcript.to_string()));
        Ok(())
    }
}
