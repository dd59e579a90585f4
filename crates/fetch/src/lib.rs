mod resolve;

pub use resolve::{AudioSource, ResolvedAudio, SourceResolver};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("audio file not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
