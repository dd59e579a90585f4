use std::borrow::Cow;
use std::path::Path;

/// One transcribed span. Timestamps are milliseconds from the start of the
/// audio; `start_ms <= end_ms`, and engines emit segments in time order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Per-run facts about a transcription, reported in logs only.
#[derive(Debug, Clone)]
pub struct TranscriptionMetadata {
    /// Decode language, or "auto" when the model detects it.
    pub language: String,
    /// Confidence in `language`, in [0, 1]. 0 when unknown.
    pub language_probability: f32,
    /// Length of the transcribed audio in seconds.
    pub duration_secs: f32,
}

/// Everything an engine produces for one piece of audio.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub segments: Vec<Segment>,
    pub metadata: TranscriptionMetadata,
}

/// Configuration handed through to the engine loader.
///
/// Values are carried as the raw strings the caller supplied; the loader is
/// the single place that interprets them, so unsupported values surface as
/// load errors rather than argument errors.
#[derive(Debug, Clone)]
pub struct TranscriptionOptions {
    pub model_size: String,
    pub device: String,
    pub compute_type: String,
    pub language: String,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            model_size: "large-v3".to_string(),
            device: "auto".to_string(),
            compute_type: "auto".to_string(),
            language: "auto".to_string(),
        }
    }
}

/// Standard sample rate for STT processing.
pub const STT_SAMPLE_RATE: u32 = 16000;

pub trait SttEngine: Send + Sync {
    /// Transcribe audio samples (expected at 16kHz mono).
    fn transcribe(&self, audio: &[f32]) -> crate::Result<Transcription>;

    /// Transcribe an audio file directly.
    ///
    /// Default implementation reads the WAV file and calls `transcribe()`.
    /// Engines with native file support can override.
    fn transcribe_file(&self, path: &Path) -> crate::Result<Transcription> {
        let samples = read_wav_mono_f32_16k(path)?;
        self.transcribe(&samples)
    }

    fn model_name(&self) -> &str;
}

/// Factory trait for creating STT engines.
///
/// Loading happens once per run, immediately before transcription. It
/// interprets the raw option strings and may fetch model files, so it is
/// async; every failure comes back as an [`SttError`].
#[async_trait::async_trait]
pub trait EngineLoader: Send + Sync {
    /// Human-readable name of the engine type (e.g., "Sherpa Whisper ONNX").
    fn name(&self) -> &str;

    async fn load(&self, options: &TranscriptionOptions) -> crate::Result<Box<dyn SttEngine>>;
}

/// Resample audio using linear interpolation.
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Cow<'_, [f32]> {
    if from_rate == to_rate {
        return Cow::Borrowed(samples);
    }
    let ratio = to_rate as f64 / from_rate as f64;
    let new_len = (samples.len() as f64 * ratio) as usize;
    let mut output = Vec::with_capacity(new_len);
    for i in 0..new_len {
        let src_idx = i as f64 / ratio;
        let idx = src_idx.floor() as usize;
        let frac = src_idx.fract() as f32;
        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };
        output.push(sample);
    }
    Cow::Owned(output)
}

/// Read a WAV file and return mono f32 samples at 16kHz.
///
/// Handles integer (up to 32-bit) and float sample formats at any source
/// rate or channel count.
pub fn read_wav_mono_f32_16k(path: &Path) -> crate::Result<Vec<f32>> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| crate::SttError::InvalidAudio(e.to_string()))?;
    let spec = reader.spec();

    let channels = spec.channels.max(1) as usize;
    let sample_rate = spec.sample_rate;

    tracing::debug!(
        sample_rate,
        channels,
        bits = spec.bits_per_sample,
        "Decoding WAV"
    );

    let raw: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|v| v as f32 / full_scale)
                        .map_err(|e| crate::SttError::InvalidAudio(e.to_string()))
                })
                .collect::<Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map_err(|e| crate::SttError::InvalidAudio(e.to_string())))
            .collect::<Result<_, _>>()?,
    };

    let mut mono = Vec::with_capacity(raw.len() / channels);
    for frame in raw.chunks(channels) {
        let sum: f32 = frame.iter().sum();
        mono.push(sum / channels as f32);
    }

    Ok(resample_linear(&mono, sample_rate, STT_SAMPLE_RATE).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        let out = resample_linear(&samples, 16000, 16000);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), samples.as_slice());
    }

    #[test]
    fn resample_doubles_length_when_upsampling() {
        let samples = vec![0.0; 8000];
        let out = resample_linear(&samples, 8000, 16000);
        assert_eq!(out.len(), 16000);
    }

    #[test]
    fn resample_interpolates_between_samples() {
        let samples = vec![0.0, 1.0];
        let out = resample_linear(&samples, 8000, 16000);
        // Midpoint between the two source samples lands at 0.5.
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn read_wav_resamples_and_mixes_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..8000 {
            writer.write_sample(8192i16).unwrap();
            writer.write_sample(-8192i16).unwrap();
        }
        writer.finalize().unwrap();

        let samples = read_wav_mono_f32_16k(&path).unwrap();
        // One second of source audio becomes one second at 16kHz.
        assert_eq!(samples.len(), 16000);
        // Opposite-phase channels cancel in the mixdown.
        assert!(samples.iter().all(|s| s.abs() < 1e-4));
    }

    #[test]
    fn read_wav_rejects_missing_file() {
        let err = read_wav_mono_f32_16k(Path::new("/no/such/audio.wav")).unwrap_err();
        assert!(matches!(err, crate::SttError::InvalidAudio(_)));
    }

    #[test]
    fn default_options_select_the_large_model() {
        let options = TranscriptionOptions::default();
        assert_eq!(options.model_size, "large-v3");
        assert_eq!(options.device, "auto");
        assert_eq!(options.compute_type, "auto");
    }
}
