//! EngineLoader implementation for the Whisper ONNX engine.
//!
//! Maps the raw transcription options onto a model bundle, execution
//! provider and file precision, fetching the bundle on first use.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use murmur_models::WhisperModel;
use murmur_stt::{EngineLoader, SttEngine, SttError, TranscriptionOptions};

use crate::{ComputeType, Provider, SherpaError, WhisperEngine};

/// Loads Whisper ONNX engines, downloading the model bundle when missing.
pub struct WhisperLoader;

#[async_trait]
impl EngineLoader for WhisperLoader {
    fn name(&self) -> &str {
        "Sherpa Whisper ONNX"
    }

    async fn load(&self, options: &TranscriptionOptions) -> murmur_stt::Result<Box<dyn SttEngine>> {
        let model = WhisperModel::parse(&options.model_size)
            .map_err(|e| SttError::LoadFailed(e.to_string()))?;
        let provider = Provider::parse(&options.device).map_err(unsupported)?;
        let compute_type = ComputeType::parse(&options.compute_type).map_err(unsupported)?;
        // Use provided language or empty string for auto-detect.
        let language = if options.language == "auto" {
            String::new()
        } else {
            options.language.clone()
        };

        let last_percent = AtomicU64::new(u64::MAX);
        let model_dir = murmur_models::ensure_downloaded(model, |done, total| {
            if total == 0 {
                return;
            }
            let percent = (done * 100 / total).min(100);
            if percent % 10 == 0 && last_percent.swap(percent, Ordering::Relaxed) != percent {
                tracing::info!(model = model.name(), percent, "Downloading model bundle");
            }
        })
        .await
        .map_err(|e| SttError::LoadFailed(e.to_string()))?;

        // Recognizer construction reads the whole bundle; keep it off the
        // async runtime threads.
        let engine = tokio::task::spawn_blocking(move || {
            WhisperEngine::new(
                &model_dir,
                model.file_prefix(),
                &language,
                provider,
                compute_type,
            )
        })
        .await
        .map_err(|e| SttError::LoadFailed(e.to_string()))?
        .map_err(|e| SttError::LoadFailed(e.to_string()))?;

        Ok(Box::new(engine))
    }
}

fn unsupported(e: SherpaError) -> SttError {
    SttError::UnsupportedConfig(e.to_string())
}
