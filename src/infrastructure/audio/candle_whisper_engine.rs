use std::fmt::Display;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

use super::audio_decoder::decode_to_mono_16k;

pub const DEFAULT_LOCAL_MODEL: &str = "openai/whisper-base";

const MEL_FILTERS_REPO: &str = "FL33TW00D-HF/whisper-base";
const MAX_DECODE_TOKENS: usize = 224;

/// Whisper inference on the CPU with weights pulled from the Hugging Face hub.
///
/// Each call receives one 16 kHz mono WAV chunk; chunks longer than the
/// model's 30 s window are decoded window by window.
pub struct CandleWhisperEngine {
    runtime: Arc<WhisperRuntime>,
}

struct WhisperRuntime {
    model: Mutex<m::model::Whisper>,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    mel_filters: Vec<f32>,
}

impl CandleWhisperEngine {
    pub fn new(model_id: &str) -> Result<Self, TranscriptionError> {
        let device = Device::Cpu;

        tracing::info!(
            device = ?device,
            model = model_id,
            "Initializing Candle Whisper transcription engine"
        );

        let api = Api::new().map_err(|e| TranscriptionError::ModelLoadFailed(e.to_string()))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(|e| load_failed("config.json", e))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| load_failed("tokenizer.json", e))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| load_failed("model.safetensors", e))?;

        let config_contents =
            std::fs::read_to_string(&config_path).map_err(|e| load_failed("read config", e))?;
        let config: Config =
            serde_json::from_str(&config_contents).map_err(|e| load_failed("parse config", e))?;

        let tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| load_failed("tokenizer", e))?;

        let mel_file = match config.num_mel_bins {
            128 => "melfilters128.bytes",
            _ => "melfilters.bytes",
        };
        let mel_path = api
            .repo(Repo::new(MEL_FILTERS_REPO.to_string(), RepoType::Model))
            .get(mel_file)
            .map_err(|e| load_failed(mel_file, e))?;
        let mel_bytes = std::fs::read(&mel_path).map_err(|e| load_failed("mel filters", e))?;
        let mel_filters = read_mel_filters(&mel_bytes, config.num_mel_bins)?;

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], m::DTYPE, &device)
                .map_err(|e| load_failed("weights", e))?
        };

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| load_failed("model", e))?;

        tracing::info!(mel_bins = config.num_mel_bins, "Candle Whisper engine loaded");

        Ok(Self {
            runtime: Arc::new(WhisperRuntime {
                model: Mutex::new(model),
                tokenizer,
                config,
                device,
                mel_filters,
            }),
        })
    }
}

#[async_trait]
impl TranscriptionEngine for CandleWhisperEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError> {
        let audio = decode_to_mono_16k(audio_data.to_vec())
            .map_err(|e| TranscriptionError::UnsupportedFormat(e.to_string()))?;

        let runtime = Arc::clone(&self.runtime);
        tokio::task::spawn_blocking(move || runtime.transcribe_pcm(&audio.samples))
            .await
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("inference task: {}", e)))?
    }
}

impl WhisperRuntime {
    fn transcribe_pcm(&self, pcm: &[f32]) -> Result<String, TranscriptionError> {
        let mel = m::audio::pcm_to_mel(&self.config, pcm, &self.mel_filters);
        let n_mel = self.config.num_mel_bins;
        let n_frames = mel.len() / n_mel;
        let mel = Tensor::from_vec(mel, (1, n_mel, n_frames), &self.device)
            .map_err(|e| inference("mel tensor", e))?;

        let content_frames = (pcm.len() / m::HOP_LENGTH).min(n_frames);

        let mut model = self
            .model
            .lock()
            .map_err(|_| TranscriptionError::TranscriptionFailed("model lock poisoned".to_string()))?;

        let mut segments: Vec<String> = Vec::new();
        let mut seek = 0;
        while seek < content_frames {
            let size = (n_frames - seek).min(m::N_FRAMES);
            let window = mel
                .narrow(2, seek, size)
                .map_err(|e| inference("mel window", e))?;

            tracing::debug!(seek, frames = size, "Decoding audio window");
            let text = self.decode_window(&mut model, &window)?;
            if !text.is_empty() {
                segments.push(text);
            }
            seek += size;
        }

        Ok(segments.join(" "))
    }

    /// Greedy decoding without timestamps.
    fn decode_window(
        &self,
        model: &mut m::model::Whisper,
        mel: &Tensor,
    ) -> Result<String, TranscriptionError> {
        let sot_token = token_id(&self.tokenizer, m::SOT_TOKEN)?;
        let transcribe_token = token_id(&self.tokenizer, m::TRANSCRIBE_TOKEN)?;
        let no_timestamps_token = token_id(&self.tokenizer, m::NO_TIMESTAMPS_TOKEN)?;
        let eot_token = token_id(&self.tokenizer, m::EOT_TOKEN)?;

        let audio_features = model
            .encoder
            .forward(mel, true)
            .map_err(|e| inference("encoder", e))?;

        let mut tokens = vec![sot_token, transcribe_token, no_timestamps_token];
        let prompt_len = tokens.len();

        for _ in 0..MAX_DECODE_TOKENS {
            let token_tensor = Tensor::new(tokens.as_slice(), &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| inference("tokens", e))?;

            let decoder_output = model
                .decoder
                .forward(&token_tensor, &audio_features, tokens.len() == prompt_len)
                .map_err(|e| inference("decoder", e))?;

            let logits = decoder_output
                .squeeze(0)
                .and_then(|out| model.decoder.final_linear(&out))
                .map_err(|e| inference("linear", e))?;

            let next_token = logits
                .dim(0)
                .and_then(|len| logits.get(len - 1))
                .and_then(|last| last.argmax(0))
                .and_then(|t| t.to_scalar::<u32>())
                .map_err(|e| inference("argmax", e))?;

            if next_token == eot_token {
                break;
            }
            tokens.push(next_token);
        }

        model.reset_kv_cache();

        let text = self
            .tokenizer
            .decode(&tokens[prompt_len..], true)
            .map_err(|e| inference("detokenize", e))?;

        Ok(text.trim().to_string())
    }
}

fn token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, TranscriptionError> {
    tokenizer.token_to_id(token).ok_or_else(|| {
        TranscriptionError::TranscriptionFailed(format!("token not found: {}", token))
    })
}

/// Little-endian f32 filter bank, `num_mel_bins x (N_FFT / 2 + 1)`.
pub fn read_mel_filters(bytes: &[u8], num_mel_bins: usize) -> Result<Vec<f32>, TranscriptionError> {
    let expected_len = num_mel_bins * (m::N_FFT / 2 + 1);
    if bytes.len() < expected_len * 4 {
        return Err(TranscriptionError::ModelLoadFailed(format!(
            "mel filters file too small: {} bytes, expected at least {}",
            bytes.len(),
            expected_len * 4
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .take(expected_len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn load_failed(what: &str, error: impl Display) -> TranscriptionError {
    TranscriptionError::ModelLoadFailed(format!("{}: {}", what, error))
}

fn inference(stage: &str, error: impl Display) -> TranscriptionError {
    TranscriptionError::TranscriptionFailed(format!("{}: {}", stage, error))
}
