use async_trait::async_trait;

use crate::domain::{JobId, JobRecord, JobRecordError};

/// A state transition applied to one record under the store's write lock.
pub type JobMutation = Box<dyn FnOnce(&mut JobRecord) -> Result<(), JobRecordError> + Send>;

/// Concurrency-safe mapping from job id to its progress record.
///
/// Readers only ever see whole records: a mutation is either applied in
/// full or, when the record refuses it, not at all.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, id: JobId, total_chunks: usize) -> Result<JobRecord, JobStoreError>;

    async fn update(&self, id: JobId, mutation: JobMutation) -> Result<JobRecord, JobStoreError>;

    async fn get(&self, id: JobId) -> Result<JobRecord, JobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job already exists: {0}")]
    Duplicate(JobId),
    #[error("update rejected: {0}")]
    Rejected(#[from] JobRecordError),
}
