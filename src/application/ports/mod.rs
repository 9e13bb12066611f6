mod audio_chunker;
mod job_store;
mod staging_store;
mod transcript_store;
mod transcription_engine;

pub use audio_chunker::{AudioChunker, AudioChunkerError};
pub use job_store::{JobMutation, JobStore, JobStoreError};
pub use staging_store::{StagingStore, StagingStoreError};
pub use transcript_store::{TranscriptStore, TranscriptStoreError};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
