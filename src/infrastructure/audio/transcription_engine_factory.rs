use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::presentation::config::{TranscriptionProviderSetting, TranscriptionSettings};

use super::azure_whisper_engine::AzureWhisperEngine;
use super::candle_whisper_engine::CandleWhisperEngine;
use super::mock_transcription_engine::MockTranscriptionEngine;
use super::openai_whisper_engine::OpenAiWhisperEngine;

const MOCK_LATENCY: Duration = Duration::from_millis(250);

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    pub fn create(
        settings: &TranscriptionSettings,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        match settings.provider {
            TranscriptionProviderSetting::Local => {
                let model = required(Some(settings.local_model.as_str()), "local_model")?;
                Ok(Arc::new(CandleWhisperEngine::new(model)?))
            }
            TranscriptionProviderSetting::OpenAi => {
                let key = required(settings.api_key.as_deref(), "api_key")?;
                Ok(Arc::new(OpenAiWhisperEngine::new(
                    key.to_string(),
                    settings.base_url.clone(),
                    Some(settings.model.clone()),
                )))
            }
            TranscriptionProviderSetting::Azure => {
                let key = required(settings.api_key.as_deref(), "api_key")?;
                let base_url = required(settings.base_url.as_deref(), "base_url")?;
                let deployment = required(settings.azure_deployment.as_deref(), "azure_deployment")?;
                Ok(Arc::new(AzureWhisperEngine::new(
                    base_url,
                    deployment,
                    key,
                    &settings.azure_api_version,
                )))
            }
            TranscriptionProviderSetting::Mock => {
                tracing::warn!("Using mock transcription engine; transcripts are placeholders");
                Ok(Arc::new(MockTranscriptionEngine::new().with_delay(MOCK_LATENCY)))
            }
        }
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, TranscriptionError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            TranscriptionError::ModelLoadFailed(format!(
                "transcription.{} is required for this provider",
                name
            ))
        })
}
