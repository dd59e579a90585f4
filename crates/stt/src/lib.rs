mod engine;

pub use engine::{
    read_wav_mono_f32_16k, EngineLoader, Segment, SttEngine, Transcription,
    TranscriptionMetadata, TranscriptionOptions, STT_SAMPLE_RATE,
};

#[derive(Debug, thiserror::Error)]
pub enum SttError {
    #[error("failed to load model: {0}")]
    LoadFailed(String),
    #[error("unsupported configuration: {0}")]
    UnsupportedConfig(String),
    #[error("failed to read audio: {0}")]
    InvalidAudio(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
}

pub type Result<T> = std::result::Result<T, SttError>;
