// Click sample loading - WAV/FLAC decoding, mono downmix and resampling

use super::SoundError;
use claxon::FlacReader;
use hound::WavReader;
use rubato::{FftFixedIn, Resampler};
use std::path::Path;

const RESAMPLER_CHUNK_FRAMES: usize = 1024;

/// Decoded click sound, mono
#[derive(Debug, Clone)]
pub struct ClickSample {
    pub name: String,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl ClickSample {
    pub fn duration_ms(&self) -> f64 {
        self.samples.len() as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Convert to `target_rate`; a no-op when rates already match
    pub fn resampled(self, target_rate: u32) -> Result<Self, SoundError> {
        if self.sample_rate == target_rate {
            return Ok(self);
        }

        let samples = resample_mono(&self.samples, self.sample_rate, target_rate)?;
        Ok(Self {
            name: self.name,
            samples,
            sample_rate: target_rate,
        })
    }
}

/// Load a click sound, dispatching on the file extension
pub fn load_click(path: &Path) -> Result<ClickSample, SoundError> {
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

    let sample = match extension.to_lowercase().as_str() {
        "wav" => load_wav(path),
        "flac" => load_flac(path),
        _ => Err(SoundError::UnsupportedFormat(extension.to_string())),
    }?;

    if sample.samples.is_empty() {
        return Err(SoundError::Empty(path.display().to_string()));
    }

    log::debug!(
        "Loaded click {} ({:.1} ms @ {} Hz)",
        sample.name,
        sample.duration_ms(),
        sample.sample_rate
    );
    Ok(sample)
}

fn decode_error(path: &Path, message: impl ToString) -> SoundError {
    SoundError::Decode {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn load_wav(path: &Path) -> Result<ClickSample, SoundError> {
    let reader = WavReader::open(path).map_err(|e| decode_error(path, e))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| decode_error(path, e))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| decode_error(path, e))?
        }
    };

    Ok(ClickSample {
        name: file_name(path),
        samples: downmix(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

fn load_flac(path: &Path) -> Result<ClickSample, SoundError> {
    let mut reader = FlacReader::open(path).map_err(|e| decode_error(path, e))?;
    let info = reader.streaminfo();
    let scale = (1i64 << (info.bits_per_sample - 1)) as f32;

    let interleaved: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|s| s as f32 / scale))
        .collect::<Result<_, _>>()
        .map_err(|e| decode_error(path, e))?;

    Ok(ClickSample {
        name: file_name(path),
        samples: downmix(&interleaved, info.channels as usize),
        sample_rate: info.sample_rate,
    })
}

/// Average interleaved frames down to one channel
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample a mono buffer, trimming the resampler's delay
pub fn resample_mono(input: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, SoundError> {
    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        RESAMPLER_CHUNK_FRAMES,
        2,
        1,
    )
    .map_err(|e| SoundError::Resample(e.to_string()))?;

    let expected_len =
        (input.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;
    let delay = resampler.output_delay();

    let mut output = Vec::with_capacity(expected_len + delay);
    let mut position = 0;

    // Keep feeding (zero-padded past the end) until the delayed tail is out
    while output.len() < expected_len + delay {
        let frames = resampler.input_frames_next();
        let mut chunk = vec![0.0f32; frames];
        if position < input.len() {
            let end = (position + frames).min(input.len());
            chunk[..end - position].copy_from_slice(&input[position..end]);
        }
        position += frames;

        let processed = resampler
            .process(&[chunk], None)
            .map_err(|e| SoundError::Resample(e.to_string()))?;
        if let Some(channel) = processed.first() {
            output.extend_from_slice(channel);
        }
    }

    output.drain(..delay);
    output.truncate(expected_len);
    Ok(output)
}
