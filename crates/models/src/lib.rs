mod download;

use std::path::{Path, PathBuf};

pub use download::ensure_downloaded;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unknown model size: {0}")]
    UnknownModel(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("archive extraction failed: {0}")]
    ExtractFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Whisper ONNX bundles published with the sherpa-onnx releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperModel {
    Tiny,
    TinyEn,
    Base,
    BaseEn,
    Small,
    SmallEn,
    Medium,
    MediumEn,
    LargeV3,
    Turbo,
}

impl WhisperModel {
    /// Interpret a `model_size` option value.
    pub fn parse(size: &str) -> Result<Self> {
        match size {
            "tiny" => Ok(Self::Tiny),
            "tiny.en" => Ok(Self::TinyEn),
            "base" => Ok(Self::Base),
            "base.en" => Ok(Self::BaseEn),
            "small" => Ok(Self::Small),
            "small.en" => Ok(Self::SmallEn),
            "medium" => Ok(Self::Medium),
            "medium.en" => Ok(Self::MediumEn),
            "large-v3" => Ok(Self::LargeV3),
            "turbo" | "large-v3-turbo" => Ok(Self::Turbo),
            other => Err(ModelError::UnknownModel(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::TinyEn => "tiny.en",
            Self::Base => "base",
            Self::BaseEn => "base.en",
            Self::Small => "small",
            Self::SmallEn => "small.en",
            Self::Medium => "medium",
            Self::MediumEn => "medium.en",
            Self::LargeV3 => "large-v3",
            Self::Turbo => "turbo",
        }
    }

    /// File prefix inside the bundle ({prefix}-encoder.onnx, {prefix}-tokens.txt, ...).
    pub fn file_prefix(&self) -> &'static str {
        self.name()
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Tiny => "sherpa-onnx-whisper-tiny",
            Self::TinyEn => "sherpa-onnx-whisper-tiny.en",
            Self::Base => "sherpa-onnx-whisper-base",
            Self::BaseEn => "sherpa-onnx-whisper-base.en",
            Self::Small => "sherpa-onnx-whisper-small",
            Self::SmallEn => "sherpa-onnx-whisper-small.en",
            Self::Medium => "sherpa-onnx-whisper-medium",
            Self::MediumEn => "sherpa-onnx-whisper-medium.en",
            Self::LargeV3 => "sherpa-onnx-whisper-large-v3",
            Self::Turbo => "sherpa-onnx-whisper-turbo",
        }
    }

    /// The bundle is a tar.bz2 archive on the sherpa-onnx release page.
    pub fn archive_url(&self) -> String {
        format!(
            "https://github.com/k2-fsa/sherpa-onnx/releases/download/asr-models/{}.tar.bz2",
            self.dir_name()
        )
    }

    /// Rough bundle size, for progress reporting.
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::Tiny | Self::TinyEn => 110_000_000,
            Self::Base | Self::BaseEn => 200_000_000,
            Self::Small | Self::SmallEn => 610_000_000,
            Self::Medium | Self::MediumEn => 1_900_000_000,
            Self::LargeV3 => 3_100_000_000,
            Self::Turbo => 1_600_000_000,
        }
    }
}

pub fn models_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("murmur")
        .join("models")
}

pub fn model_path(model: WhisperModel) -> PathBuf {
    models_dir().join(model.dir_name())
}

pub fn is_downloaded(model: WhisperModel) -> bool {
    is_downloaded_in(&models_dir(), model)
}

/// Check for the required model files under a specific base directory.
///
/// A bundle is usable once the tokens file plus one precision variant of
/// both the encoder and the decoder are present.
pub fn is_downloaded_in(base: &Path, model: WhisperModel) -> bool {
    let dir = base.join(model.dir_name());
    if !dir.exists() {
        return false;
    }

    let prefix = model.file_prefix();
    let has = |component: &str| {
        dir.join(format!("{prefix}-{component}.onnx")).exists()
            || dir.join(format!("{prefix}-{component}.int8.onnx")).exists()
    };

    dir.join(format!("{prefix}-tokens.txt")).exists() && has("encoder") && has("decoder")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_sizes() {
        assert_eq!(WhisperModel::parse("tiny.en").unwrap(), WhisperModel::TinyEn);
        assert_eq!(WhisperModel::parse("large-v3").unwrap(), WhisperModel::LargeV3);
        assert_eq!(WhisperModel::parse("turbo").unwrap(), WhisperModel::Turbo);
    }

    #[test]
    fn parse_rejects_unknown_sizes() {
        let err = WhisperModel::parse("enormous").unwrap_err();
        assert!(matches!(err, ModelError::UnknownModel(_)));
        assert!(err.to_string().contains("enormous"));
    }

    #[test]
    fn archive_url_points_at_the_release_bundle() {
        assert_eq!(
            WhisperModel::Small.archive_url(),
            "https://github.com/k2-fsa/sherpa-onnx/releases/download/asr-models/sherpa-onnx-whisper-small.tar.bz2"
        );
    }

    #[test]
    fn is_downloaded_requires_all_files() {
        let base = tempfile::tempdir().unwrap();
        let model = WhisperModel::Base;
        assert!(!is_downloaded_in(base.path(), model));

        let dir = base.path().join(model.dir_name());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("base-tokens.txt"), "tokens").unwrap();
        std::fs::write(dir.join("base-encoder.int8.onnx"), "onnx").unwrap();
        assert!(!is_downloaded_in(base.path(), model));

        std::fs::write(dir.join("base-decoder.int8.onnx"), "onnx").unwrap();
        assert!(is_downloaded_in(base.path(), model));
    }

    #[test]
    fn is_downloaded_accepts_either_precision() {
        let base = tempfile::tempdir().unwrap();
        let model = WhisperModel::Tiny;
        let dir = base.path().join(model.dir_name());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tiny-tokens.txt"), "tokens").unwrap();
        std::fs::write(dir.join("tiny-encoder.onnx"), "onnx").unwrap();
        std::fs::write(dir.join("tiny-decoder.int8.onnx"), "onnx").unwrap();
        assert!(is_downloaded_in(base.path(), model));
    }
}
