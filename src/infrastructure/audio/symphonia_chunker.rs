use std::io::Cursor;
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::application::ports::{AudioChunker, AudioChunkerError};
use crate::domain::AudioChunk;

use super::audio_decoder::{TARGET_SAMPLE_RATE, decode_to_mono_16k};

/// Decodes with symphonia and re-encodes each slice as 16 kHz mono 16-bit WAV.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaAudioChunker;

impl SymphoniaAudioChunker {
    pub fn new() -> Self {
        Self
    }
}

impl AudioChunker for SymphoniaAudioChunker {
    fn split(
        &self,
        data: Vec<u8>,
        chunk_duration: Duration,
    ) -> Result<Vec<AudioChunk>, AudioChunkerError> {
        let samples_per_chunk =
            (chunk_duration.as_secs_f64() * TARGET_SAMPLE_RATE as f64).round() as usize;
        if samples_per_chunk == 0 {
            return Err(AudioChunkerError::InvalidChunkDuration(chunk_duration));
        }

        let audio = decode_to_mono_16k(data)?;

        let chunks = audio
            .samples
            .chunks(samples_per_chunk)
            .enumerate()
            .map(|(index, slice)| {
                let start = samples_to_duration(index * samples_per_chunk);
                let duration = samples_to_duration(slice.len());
                encode_wav(slice).map(|wav| AudioChunk::new(index, start, duration, wav))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            chunks = chunks.len(),
            duration_secs = audio.duration_secs(),
            chunk_secs = chunk_duration.as_secs_f64(),
            "Audio split into chunks"
        );

        Ok(chunks)
    }
}

fn samples_to_duration(samples: usize) -> Duration {
    Duration::from_secs_f64(samples as f64 / TARGET_SAMPLE_RATE as f64)
}

fn encode_wav(samples: &[f32]) -> Result<Vec<u8>, AudioChunkerError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| AudioChunkerError::EncodingFailed(e.to_string()))?;
        for &sample in samples {
            let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(pcm)
                .map_err(|e| AudioChunkerError::EncodingFailed(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioChunkerError::EncodingFailed(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
