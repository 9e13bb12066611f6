mod job_runner;
mod transcription_service;

pub use job_runner::{JobRunner, JobRunnerError, estimate_remaining_secs};
pub use transcription_service::{SubmissionError, TranscriptionService};
