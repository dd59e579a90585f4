//! Whisper ONNX offline transcription engine.
//!
//! Uses sherpa-onnx's offline Whisper API for non-streaming transcription.
//! Whisper models are multilingual and provide high-quality transcription.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use murmur_stt::{Segment, SttEngine, Transcription, TranscriptionMetadata, STT_SAMPLE_RATE};
use sherpa_rs::whisper::{WhisperConfig, WhisperRecognizer};

use crate::{ComputeType, Provider, Result, SherpaError};

/// Samples per decode window. Whisper's receptive field is 30 seconds, so
/// longer audio is transcribed window by window, one segment per window.
const WINDOW_SAMPLES: usize = 30 * STT_SAMPLE_RATE as usize;

/// Whisper ONNX engine for offline (non-streaming) transcription.
///
/// Runs batch inference over fixed windows, making it suitable for
/// transcribing complete audio files of any length.
pub struct WhisperEngine {
    recognizer: Mutex<WhisperRecognizer>,
    model_name: String,
    language: String,
}

impl WhisperEngine {
    /// Create a new Whisper engine from model files.
    ///
    /// # Arguments
    /// * `model_dir` - Directory containing the model bundle
    /// * `prefix` - Bundle file prefix (e.g., "tiny", "base", "large-v3")
    /// * `language` - Language code (e.g., "en", "es") or empty for auto-detect
    /// * `provider` - ONNX execution provider
    /// * `compute_type` - Which precision variant of the model files to load
    ///
    /// # Model Files
    /// The model directory should contain:
    /// - `{prefix}-encoder.onnx` or `{prefix}-encoder.int8.onnx`
    /// - `{prefix}-decoder.onnx` or `{prefix}-decoder.int8.onnx`
    /// - `{prefix}-tokens.txt`
    pub fn new(
        model_dir: impl AsRef<Path>,
        prefix: &str,
        language: &str,
        provider: Provider,
        compute_type: ComputeType,
    ) -> Result<Self> {
        let model_dir = model_dir.as_ref();

        let encoder = find_model_file(model_dir, prefix, "encoder", compute_type)?;
        let decoder = find_model_file(model_dir, prefix, "decoder", compute_type)?;
        let tokens = model_dir.join(format!("{prefix}-tokens.txt"));

        if !tokens.exists() {
            return Err(SherpaError::MissingFiles(format!(
                "tokens file not found: {}",
                tokens.display()
            )));
        }

        tracing::info!(
            encoder = %encoder.display(),
            decoder = %decoder.display(),
            tokens = %tokens.display(),
            language = language,
            provider = provider.as_str(),
            "Loading Whisper ONNX model"
        );

        let config = WhisperConfig {
            encoder: encoder.to_string_lossy().to_string(),
            decoder: decoder.to_string_lossy().to_string(),
            tokens: tokens.to_string_lossy().to_string(),
            language: language.to_string(),
            num_threads: Some(2),
            provider: Some(provider.as_str().to_string()),
            ..Default::default()
        };

        let recognizer = WhisperRecognizer::new(config).map_err(|e| {
            tracing::error!(error = %e, "Failed to create Whisper recognizer");
            SherpaError::LoadFailed(e.to_string())
        })?;

        let model_name = model_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("whisper")
            .to_string();

        Ok(Self {
            recognizer: Mutex::new(recognizer),
            model_name,
            language: language.to_string(),
        })
    }

    /// Transcribe one window of 16kHz mono samples.
    fn transcribe_window(&self, audio: &[f32]) -> Result<String> {
        let mut recognizer = self
            .recognizer
            .lock()
            .map_err(|_| SherpaError::TranscriptionFailed("lock poisoned".to_string()))?;

        let result = recognizer.transcribe(STT_SAMPLE_RATE, audio);
        Ok(result.text.trim().to_string())
    }

    fn metadata_for(&self, sample_count: usize) -> TranscriptionMetadata {
        let forced = !self.language.is_empty();
        TranscriptionMetadata {
            language: if forced {
                self.language.clone()
            } else {
                "auto".to_string()
            },
            // The recognizer does not surface detection confidence.
            language_probability: if forced { 1.0 } else { 0.0 },
            duration_secs: sample_count as f32 / STT_SAMPLE_RATE as f32,
        }
    }
}

impl SttEngine for WhisperEngine {
    fn transcribe(&self, audio: &[f32]) -> murmur_stt::Result<Transcription> {
        let mut segments = Vec::new();

        for (i, window) in audio.chunks(WINDOW_SAMPLES).enumerate() {
            let text = self
                .transcribe_window(window)
                .map_err(|e| murmur_stt::SttError::TranscriptionFailed(e.to_string()))?;
            if text.is_empty() {
                continue;
            }
            let (start_ms, end_ms) = window_span_ms(i, window.len());
            segments.push(Segment {
                text,
                start_ms,
                end_ms,
            });
        }

        Ok(Transcription {
            segments,
            metadata: self.metadata_for(audio.len()),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Millisecond span covered by the `index`-th window, `len` samples long.
fn window_span_ms(index: usize, len: usize) -> (u64, u64) {
    let start = index * WINDOW_SAMPLES;
    let to_ms = |samples: usize| (samples as f64 / STT_SAMPLE_RATE as f64 * 1000.0).round() as u64;
    (to_ms(start), to_ms(start + len))
}

/// Find the model file variant matching the requested compute type.
fn find_model_file(
    model_dir: &Path,
    prefix: &str,
    component: &str,
    compute_type: ComputeType,
) -> Result<PathBuf> {
    let int8_path = model_dir.join(format!("{prefix}-{component}.int8.onnx"));
    let fp32_path = model_dir.join(format!("{prefix}-{component}.onnx"));

    let chosen = match compute_type {
        // Prefer int8: smaller and faster on CPU.
        ComputeType::Auto => [&int8_path, &fp32_path]
            .into_iter()
            .find(|p| p.exists())
            .cloned(),
        ComputeType::Int8 => int8_path.exists().then(|| int8_path.clone()),
        ComputeType::Fp32 => fp32_path.exists().then(|| fp32_path.clone()),
    };

    chosen.ok_or_else(|| {
        SherpaError::MissingFiles(format!(
            "{} not found in {} (tried {} and {})",
            component,
            model_dir.display(),
            int8_path.display(),
            fp32_path.display()
        ))
    })
}
