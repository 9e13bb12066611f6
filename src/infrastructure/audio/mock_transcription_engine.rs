use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

/// Scripted engine for local runs and tests.
///
/// Call `n` returns `script[n]`, or a placeholder naming the chunk size once
/// the script runs out. `failing_at(n)` makes call `n` fail.
#[derive(Debug, Default)]
pub struct MockTranscriptionEngine {
    script: Vec<String>,
    fail_at: Option<usize>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockTranscriptionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail_at == Some(call) {
            return Err(TranscriptionError::TranscriptionFailed(format!(
                "mock engine failure on call {}",
                call
            )));
        }

        Ok(self
            .script
            .get(call)
            .cloned()
            .unwrap_or_else(|| format!("[{} bytes of audio]", audio_data.len())))
    }
}
