mod pipeline;

pub use pipeline::TranscriptionPipeline;

use murmur_fetch::SourceError;
use murmur_stt::SttError;

/// Everything that can end a run early. The variants are transparent so the
/// failure envelope carries the underlying message unchanged.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Engine(#[from] SttError),
    #[error("internal error: {0}")]
    Internal(String),
}
