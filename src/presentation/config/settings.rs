use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::infrastructure::audio::DEFAULT_LOCAL_MODEL;

use super::Environment;

const ENV_PREFIX: &str = "APP";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub transcription: TranscriptionSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub provider: TranscriptionProviderSetting,
    /// Hugging Face repo of the Whisper weights used by the `local` provider.
    pub local_model: String,
    /// Model name sent to hosted providers.
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub azure_deployment: Option<String>,
    pub azure_api_version: String,
    pub chunk_duration_secs: u64,
    pub max_concurrent_transcriptions: usize,
}

impl TranscriptionSettings {
    pub fn chunk_duration(&self) -> Duration {
        Duration::from_secs(self.chunk_duration_secs)
    }

    pub fn engine_permits(&self) -> usize {
        self.max_concurrent_transcriptions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProviderSetting {
    Local,
    #[serde(rename = "openai")]
    OpenAi,
    Azure,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub upload_dir: String,
    pub transcripts_dir: String,
    pub max_upload_size_bytes: usize,
    pub delete_upload_after_processing: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Defaults, then `appsettings.{environment}.toml` if present, then `APP__*` variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let settings: Self = Self::builder(environment)?.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values that would make every job fail or stall.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transcription.chunk_duration_secs == 0 {
            return Err(ConfigError::Message(
                "transcription.chunk_duration_secs must be greater than zero".to_string(),
            ));
        }
        if self.transcription.max_concurrent_transcriptions == 0 {
            return Err(ConfigError::Message(
                "transcription.max_concurrent_transcriptions must be greater than zero"
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn builder(
        environment: Environment,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("transcription.provider", "local")?
            .set_default("transcription.local_model", DEFAULT_LOCAL_MODEL)?
            .set_default("transcription.model", "whisper-1")?
            .set_default("transcription.azure_api_version", "2024-06-01")?
            .set_default("transcription.chunk_duration_secs", 15)?
            .set_default("transcription.max_concurrent_transcriptions", 1)?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.transcripts_dir", "transcripts")?
            .set_default("storage.max_upload_size_bytes", 1_073_741_824_u64)?
            .set_default("storage.delete_upload_after_processing", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );
        Ok(builder)
    }
}
