mod loader;
mod whisper;

pub use loader::WhisperLoader;
pub use whisper::WhisperEngine;

/// ONNX execution provider, selected by the `device` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Cpu,
    Cuda,
    CoreMl,
}

impl Provider {
    /// Interpret a raw `device` option value.
    ///
    /// `auto` resolves to CPU: the pre-built sherpa-onnx bundles are
    /// compiled for the CPU provider, so it is the one choice that works
    /// everywhere.
    pub fn parse(device: &str) -> Result<Self> {
        match device {
            "auto" | "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda),
            "coreml" => Ok(Self::CoreMl),
            other => Err(SherpaError::UnsupportedDevice(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
            Self::CoreMl => "coreml",
        }
    }
}

/// Model file precision, selected by the `compute_type` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeType {
    /// Prefer int8 files, fall back to fp32.
    #[default]
    Auto,
    Int8,
    Fp32,
}

impl ComputeType {
    /// Interpret a raw `compute_type` option value. `default` is accepted
    /// as a synonym for `auto`.
    pub fn parse(compute_type: &str) -> Result<Self> {
        match compute_type {
            "auto" | "default" => Ok(Self::Auto),
            "int8" => Ok(Self::Int8),
            "fp32" | "float32" => Ok(Self::Fp32),
            other => Err(SherpaError::UnsupportedComputeType(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SherpaError {
    #[error("model files not found: {0}")]
    MissingFiles(String),
    #[error("unsupported device: {0}")]
    UnsupportedDevice(String),
    #[error("unsupported compute type: {0}")]
    UnsupportedComputeType(String),
    #[error("load failed: {0}")]
    LoadFailed(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
}

pub type Result<T> = std::result::Result<T, SherpaError>;
