use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::application::ports::{JobMutation, JobStore, JobStoreError};
use crate::domain::{JobId, JobRecord};

/// Process-local job store. Records live for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    #[instrument(skip(self), fields(job_id = %id))]
    async fn create(&self, id: JobId, total_chunks: usize) -> Result<JobRecord, JobStoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&id) {
            return Err(JobStoreError::Duplicate(id));
        }

        let record = JobRecord::new(total_chunks);
        jobs.insert(id, record.clone());
        Ok(record)
    }

    #[instrument(skip(self, mutation), fields(job_id = %id))]
    async fn update(&self, id: JobId, mutation: JobMutation) -> Result<JobRecord, JobStoreError> {
        let mut jobs = self.jobs.write().await;
        let current = jobs.get_mut(&id).ok_or(JobStoreError::NotFound(id))?;

        // Mutate a copy so a refused transition never leaves a half-applied record.
        let mut next = current.clone();
        mutation(&mut next)?;
        *current = next.clone();
        Ok(next)
    }

    async fn get(&self, id: JobId) -> Result<JobRecord, JobStoreError> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(JobStoreError::NotFound(id))
    }
}
