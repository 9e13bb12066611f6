use std::time::Duration;

use crate::domain::AudioChunk;

/// Splits an encoded audio/video payload into ordered, gap-free chunks.
///
/// Decoding is CPU bound; callers on the async runtime should run it on the
/// blocking pool.
pub trait AudioChunker: Send + Sync {
    /// Takes the upload by value so the decoder can read it without another copy.
    fn split(
        &self,
        data: Vec<u8>,
        chunk_duration: Duration,
    ) -> Result<Vec<AudioChunk>, AudioChunkerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioChunkerError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("invalid chunk duration: {0:?}")]
    InvalidChunkDuration(Duration),
    #[error("chunk encoding failed: {0}")]
    EncodingFailed(String),
}
