use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

use super::whisper_http::{chunk_form, send};

pub struct AzureWhisperEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl AzureWhisperEngine {
    pub fn new(base_url: &str, deployment: &str, api_key: &str, api_version: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!(
                "{}/openai/deployments/{}/audio/transcriptions?api-version={}",
                base_url.trim_end_matches('/'),
                deployment,
                api_version,
            ),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct AzureTranscription {
    text: String,
}

#[async_trait]
impl TranscriptionEngine for AzureWhisperEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError> {
        let form = chunk_form(audio_data)?;

        tracing::debug!(endpoint = %self.endpoint, bytes = audio_data.len(), "Sending chunk to Azure OpenAI Whisper");

        let response = send(
            self.client
                .post(&self.endpoint)
                .header("api-key", &self.api_key)
                .multipart(form),
        )
        .await?;

        let body: AzureTranscription = response
            .json()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("parse response: {}", e)))?;

        Ok(body.text.trim().to_string())
    }
}
