use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use tokio::sync::Semaphore;
use tracing::Instrument;

use crate::application::ports::{
    AudioChunker, AudioChunkerError, JobStore, JobStoreError, StagingStore, StagingStoreError,
    TranscriptStore, TranscriptionEngine, TranscriptionError,
};
use crate::domain::{AudioChunk, JobId, JobRecord, StoragePath, TranscriptionJob};

/// Linear extrapolation from the average latency of the chunks done so far.
pub fn estimate_remaining_secs(elapsed_secs: f64, total_chunks: usize, index: usize) -> f64 {
    let done = index + 1;
    let left = total_chunks.saturating_sub(done);
    elapsed_secs * left as f64 / done as f64
}

/// Drives one job at a time from staged upload to a terminal record.
///
/// A single runner is shared by every job; `engine_permits` bounds how many
/// chunks are inside the inference engine at once across all jobs.
pub struct JobRunner {
    job_store: Arc<dyn JobStore>,
    staging_store: Arc<dyn StagingStore>,
    transcript_store: Arc<dyn TranscriptStore>,
    chunker: Arc<dyn AudioChunker>,
    transcription_engine: Arc<dyn TranscriptionEngine>,
    engine_permits: Arc<Semaphore>,
    chunk_duration: Duration,
    delete_upload_after_processing: bool,
}

impl JobRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_store: Arc<dyn JobStore>,
        staging_store: Arc<dyn StagingStore>,
        transcript_store: Arc<dyn TranscriptStore>,
        chunker: Arc<dyn AudioChunker>,
        transcription_engine: Arc<dyn TranscriptionEngine>,
        engine_permits: Arc<Semaphore>,
        chunk_duration: Duration,
        delete_upload_after_processing: bool,
    ) -> Self {
        Self {
            job_store,
            staging_store,
            transcript_store,
            chunker,
            transcription_engine,
            engine_permits,
            chunk_duration,
            delete_upload_after_processing,
        }
    }

    pub async fn run(&self, job: TranscriptionJob) {
        let span = tracing::info_span!(
            "transcription_job",
            job_id = %job.id,
            filename = %job.filename,
        );

        async {
            if let Err(e) = self.process_job(&job).await {
                tracing::error!(error = %e, "Transcription job failed");
            }
        }
        .instrument(span)
        .await
    }

    async fn process_job(&self, job: &TranscriptionJob) -> Result<(), JobRunnerError> {
        let result = self.process_pipeline(job).await;

        match &result {
            Ok(transcript) => {
                let path = StoragePath::for_transcript(&Local::now(), &job.upload_path);
                match self.transcript_store.save(&path, transcript).await {
                    Ok(()) => tracing::debug!(path = %path, "Transcript saved"),
                    Err(e) => tracing::warn!(
                        error = %e,
                        path = %path,
                        "Failed to save transcript; it remains available from the job store"
                    ),
                }

                self.job_store
                    .update(job.id, Box::new(|record: &mut JobRecord| record.mark_complete()))
                    .await
                    .map_err(JobRunnerError::Store)?;
                tracing::info!(chars = transcript.len(), "Transcription completed");
            }
            Err(e) => {
                self.record_failure(job.id, e.to_string()).await;
            }
        }

        if self.delete_upload_after_processing {
            if let Err(e) = self.staging_store.delete(&job.upload_path).await {
                tracing::warn!(
                    error = %e,
                    path = %job.upload_path,
                    "Failed to delete staged upload"
                );
            }
        }

        result.map(|_| ())
    }

    async fn process_pipeline(&self, job: &TranscriptionJob) -> Result<String, JobRunnerError> {
        let chunks = self.split_upload(&job.upload_path).await?;
        let total_chunks = chunks.len();

        self.job_store
            .update(
                job.id,
                Box::new(move |record: &mut JobRecord| {
                    record.set_total_chunks(total_chunks)
                }),
            )
            .await
            .map_err(JobRunnerError::Store)?;
        tracing::debug!(total_chunks, "Upload split into chunks");

        let started = Instant::now();
        let mut transcript = String::new();

        for chunk in chunks {
            let index = chunk.index;
            let text = self.transcribe_chunk(&chunk).await?;

            transcript.push_str(&text);
            transcript.push('\n');

            let elapsed = started.elapsed().as_secs_f64();
            let remaining = estimate_remaining_secs(elapsed, total_chunks, index);

            self.job_store
                .update(
                    job.id,
                    Box::new(move |record: &mut JobRecord| {
                        record.record_chunk(&text, elapsed, remaining)
                    }),
                )
                .await
                .map_err(JobRunnerError::Store)?;

            tracing::debug!(
                chunk = index + 1,
                total_chunks,
                elapsed_secs = elapsed,
                remaining_secs = remaining,
                "Chunk transcribed"
            );
        }

        Ok(transcript)
    }

    async fn split_upload(&self, path: &StoragePath) -> Result<Vec<AudioChunk>, JobRunnerError> {
        let data = self
            .staging_store
            .fetch(path)
            .await
            .map_err(JobRunnerError::Staging)?;

        let chunker = Arc::clone(&self.chunker);
        let chunk_duration = self.chunk_duration;

        tokio::task::spawn_blocking(move || chunker.split(data, chunk_duration))
            .await
            .map_err(|e| JobRunnerError::Task(format!("chunker task: {}", e)))?
            .map_err(JobRunnerError::Decoding)
    }

    async fn transcribe_chunk(&self, chunk: &AudioChunk) -> Result<String, JobRunnerError> {
        let _permit = self
            .engine_permits
            .acquire()
            .await
            .map_err(|e| JobRunnerError::Task(format!("engine admission: {}", e)))?;

        self.transcription_engine
            .transcribe(&chunk.data)
            .await
            .map_err(|source| JobRunnerError::Transcription {
                index: chunk.index,
                source,
            })
    }

    async fn record_failure(&self, id: JobId, message: String) {
        if let Err(e) = self
            .job_store
            .update(id, Box::new(move |record: &mut JobRecord| record.mark_failed(message)))
            .await
        {
            tracing::error!(error = %e, "Failed to record job failure");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobRunnerError {
    #[error("staging store: {0}")]
    Staging(StagingStoreError),
    #[error("decoding: {0}")]
    Decoding(AudioChunkerError),
    #[error("chunk {}: {source}", .index + 1)]
    Transcription {
        index: usize,
        source: TranscriptionError,
    },
    #[error("job store: {0}")]
    Store(JobStoreError),
    #[error("task: {0}")]
    Task(String),
}
