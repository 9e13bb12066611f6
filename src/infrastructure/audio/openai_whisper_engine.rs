use async_trait::async_trait;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

use super::whisper_http::{chunk_form, send};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "whisper-1";

/// OpenAI-compatible `/audio/transcriptions` client (also fits self-hosted servers).
pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiWhisperEngine {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/audio/transcriptions", base_url.trim_end_matches('/')),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError> {
        let form = chunk_form(audio_data)?
            .text("model", self.model.clone())
            .text("response_format", "text");

        tracing::debug!(model = %self.model, bytes = audio_data.len(), "Sending chunk to OpenAI Whisper");

        let response = send(
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .multipart(form),
        )
        .await?;

        let text = response
            .text()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("body: {}", e)))?;

        Ok(text.trim().to_string())
    }
}
