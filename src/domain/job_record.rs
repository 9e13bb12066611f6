use serde::Serialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JobRecordError {
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

/// Progress state of one transcription job, as published to pollers.
///
/// Fields are private so every change goes through a transition method;
/// a refused transition leaves the record untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    progress: f64,
    transcript: String,
    total_chunks: usize,
    processed_chunks: usize,
    elapsed_time: f64,
    remaining_time: f64,
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl JobRecord {
    pub fn new(total_chunks: usize) -> Self {
        Self {
            progress: 0.0,
            transcript: String::new(),
            total_chunks,
            processed_chunks: 0,
            elapsed_time: 0.0,
            remaining_time: 0.0,
            complete: false,
            error: None,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    pub fn processed_chunks(&self) -> usize {
        self.processed_chunks
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn remaining_time(&self) -> f64 {
        self.remaining_time
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.complete || self.error.is_some()
    }

    /// Fixes the chunk count once the upload has been split.
    pub fn set_total_chunks(&mut self, total_chunks: usize) -> Result<(), JobRecordError> {
        if self.total_chunks == total_chunks {
            return Ok(());
        }
        if self.total_chunks != 0 || self.processed_chunks != 0 || self.is_terminal() {
            return Err(JobRecordError::InvalidTransition(format!(
                "total chunks already fixed at {}",
                self.total_chunks
            )));
        }
        self.total_chunks = total_chunks;
        self.progress = percent(self.processed_chunks, self.total_chunks);
        Ok(())
    }

    /// Appends the next chunk's text and refreshes the timing estimates.
    pub fn record_chunk(
        &mut self,
        text: &str,
        elapsed_time: f64,
        remaining_time: f64,
    ) -> Result<(), JobRecordError> {
        if self.is_terminal() {
            return Err(JobRecordError::InvalidTransition(
                "cannot record a chunk on a finished job".to_string(),
            ));
        }
        if self.processed_chunks >= self.total_chunks {
            return Err(JobRecordError::InvalidTransition(format!(
                "all {} chunks already processed",
                self.total_chunks
            )));
        }

        self.transcript.push_str(text);
        self.transcript.push('\n');
        self.processed_chunks += 1;
        self.progress = percent(self.processed_chunks, self.total_chunks);
        self.elapsed_time = self.elapsed_time.max(elapsed_time);
        self.remaining_time = remaining_time.max(0.0);
        Ok(())
    }

    pub fn mark_complete(&mut self) -> Result<(), JobRecordError> {
        if let Some(error) = &self.error {
            return Err(JobRecordError::InvalidTransition(format!(
                "job already failed: {}",
                error
            )));
        }
        if self.processed_chunks != self.total_chunks {
            return Err(JobRecordError::InvalidTransition(format!(
                "only {} of {} chunks processed",
                self.processed_chunks, self.total_chunks
            )));
        }
        self.complete = true;
        self.remaining_time = 0.0;
        Ok(())
    }

    /// Records a terminal failure. The first recorded error wins.
    pub fn mark_failed(&mut self, message: impl Into<String>) -> Result<(), JobRecordError> {
        if self.complete {
            return Err(JobRecordError::InvalidTransition(
                "job already complete".to_string(),
            ));
        }
        if self.error.is_none() {
            let message = message.into();
            self.error = Some(if message.trim().is_empty() {
                "unknown error".to_string()
            } else {
                message
            });
        }
        Ok(())
    }
}

fn percent(processed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        processed as f64 / total as f64 * 100.0
    }
}
