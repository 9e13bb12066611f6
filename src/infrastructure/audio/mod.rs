pub mod audio_decoder;
mod azure_whisper_engine;
mod candle_whisper_engine;
mod mock_transcription_engine;
mod openai_whisper_engine;
mod symphonia_chunker;
mod transcription_engine_factory;
mod whisper_http;

pub use azure_whisper_engine::AzureWhisperEngine;
pub use candle_whisper_engine::{CandleWhisperEngine, DEFAULT_LOCAL_MODEL, read_mel_filters};
pub use mock_transcription_engine::MockTranscriptionEngine;
pub use openai_whisper_engine::OpenAiWhisperEngine;
pub use symphonia_chunker::SymphoniaAudioChunker;
pub use transcription_engine_factory::TranscriptionEngineFactory;
