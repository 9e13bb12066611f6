use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::application::ports::{JobStore, JobStoreError, StagingStore, StagingStoreError};
use crate::domain::{JobId, JobRecord, TranscriptionJob, upload_filename};

use super::JobRunner;

const UNEXPECTED_TERMINATION: &str = "transcription job terminated unexpectedly";

/// Entry point for submitting uploads and polling their progress.
pub struct TranscriptionService {
    job_store: Arc<dyn JobStore>,
    staging_store: Arc<dyn StagingStore>,
    runner: Arc<JobRunner>,
}

impl TranscriptionService {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        staging_store: Arc<dyn StagingStore>,
        runner: Arc<JobRunner>,
    ) -> Self {
        Self {
            job_store,
            staging_store,
            runner,
        }
    }

    /// Stages the upload, registers its record and starts a supervised runner.
    ///
    /// Returns as soon as the job is registered; no transcription work is awaited.
    /// An upload with no bytes is discarded and no job is created.
    pub async fn submit(
        &self,
        filename: Option<&str>,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<JobId, SubmissionError> {
        let job = TranscriptionJob::new(JobId::new(), upload_filename(filename));

        let size = self
            .staging_store
            .store(&job.upload_path, stream)
            .await
            .map_err(SubmissionError::Staging)?;
        tracing::debug!(path = %job.upload_path, bytes = size, "Upload staged");

        if size == 0 {
            if let Err(e) = self.staging_store.delete(&job.upload_path).await {
                tracing::warn!(error = %e, path = %job.upload_path, "Failed to discard empty upload");
            }
            return Err(SubmissionError::EmptyUpload);
        }

        self.job_store
            .create(job.id, 0)
            .await
            .map_err(SubmissionError::Store)?;

        let job_id = job.id;
        tracing::info!(job_id = %job_id, filename = %job.filename, "Transcription job submitted");
        self.dispatch(job);

        Ok(job_id)
    }

    pub async fn progress(&self, id: JobId) -> Result<JobRecord, JobStoreError> {
        self.job_store.get(id).await
    }

    /// Spawns the runner and a watcher that turns a panic or abort into a failed record.
    fn dispatch(&self, job: TranscriptionJob) {
        let job_id = job.id;
        let runner = Arc::clone(&self.runner);
        let job_store = Arc::clone(&self.job_store);

        let handle = tokio::spawn(async move { runner.run(job).await });

        tokio::spawn(async move {
            let Err(join_error) = handle.await else {
                return;
            };

            tracing::error!(job_id = %job_id, error = %join_error, "Transcription task crashed");
            let outcome = job_store
                .update(
                    job_id,
                    Box::new(|record: &mut JobRecord| record.mark_failed(UNEXPECTED_TERMINATION)),
                )
                .await;
            if let Err(e) = outcome {
                tracing::error!(job_id = %job_id, error = %e, "Failed to record crashed job");
            }
        });
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("staging store: {0}")]
    Staging(StagingStoreError),
    #[error("job store: {0}")]
    Store(JobStoreError),
    #[error("upload is empty")]
    EmptyUpload,
}
