use std::io::Cursor;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::AudioChunkerError;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

const RESAMPLE_BLOCK: usize = 1024;

/// Mono PCM in [-1.0, 1.0].
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decodes any container symphonia can probe into 16 kHz mono PCM.
pub fn decode_to_mono_16k(data: Vec<u8>) -> Result<DecodedAudio, AudioChunkerError> {
    let decoded = decode_to_mono(data)?;
    if decoded.sample_rate == TARGET_SAMPLE_RATE {
        return Ok(decoded);
    }

    let samples = resample(&decoded.samples, decoded.sample_rate, TARGET_SAMPLE_RATE)?;
    Ok(DecodedAudio {
        samples,
        sample_rate: TARGET_SAMPLE_RATE,
    })
}

fn decode_to_mono(data: Vec<u8>) -> Result<DecodedAudio, AudioChunkerError> {
    let source = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decoding(format!("probe: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| decoding("no audio track found"))?;
    let track_id = track.id;
    let params = track.codec_params.clone();
    let sample_rate = params
        .sample_rate
        .ok_or_else(|| decoding("unknown sample rate"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| decoding(format!("codec: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(decoding(format!("packet: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let buffer = match decoder.decode(&packet) {
            Ok(buffer) => buffer,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => return Err(decoding(format!("decode: {}", e))),
        };

        let frames = buffer.frames();
        if frames == 0 {
            continue;
        }
        let spec = *buffer.spec();
        let channels = spec.channels.count().max(1);

        let mut interleaved = SampleBuffer::<f32>::new(frames as u64, spec);
        interleaved.copy_interleaved_ref(buffer);

        samples.extend(
            interleaved
                .samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    if samples.is_empty() {
        return Err(decoding("no audio samples decoded"));
    }

    tracing::debug!(
        samples = samples.len(),
        sample_rate,
        "Audio decoded to mono PCM"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioChunkerError> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = to_rate as f64 / from_rate as f64;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, RESAMPLE_BLOCK, 1)
        .map_err(|e| decoding(format!("resampler init: {}", e)))?;

    let expected_len = (samples.len() as f64 * ratio) as usize;
    let mut output = Vec::with_capacity(expected_len + RESAMPLE_BLOCK);

    for block in samples.chunks(RESAMPLE_BLOCK) {
        let mut input = block.to_vec();
        input.resize(RESAMPLE_BLOCK, 0.0);

        let resampled = resampler
            .process(&[input], None)
            .map_err(|e| decoding(format!("resample: {}", e)))?;
        if let Some(channel) = resampled.first() {
            output.extend_from_slice(channel);
        }
    }

    // The last block was zero-padded.
    output.truncate(expected_len);
    Ok(output)
}

fn decoding(message: impl Into<String>) -> AudioChunkerError {
    AudioChunkerError::DecodingFailed(message.into())
}
