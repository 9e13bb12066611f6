use std::time::Duration;

/// One fixed-duration slice of an upload, encoded as a standalone WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub index: usize,
    pub start: Duration,
    pub duration: Duration,
    pub data: Vec<u8>,
}

impl AudioChunk {
    pub fn new(index: usize, start: Duration, duration: Duration, data: Vec<u8>) -> Self {
        Self {
            index,
            start,
            duration,
            data,
        }
    }

    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}
