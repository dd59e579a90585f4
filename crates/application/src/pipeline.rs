use std::io::Write;
use std::time::Instant;

use murmur_fetch::{AudioSource, ResolvedAudio, SourceResolver};
use murmur_stt::{EngineLoader, Segment, TranscriptionOptions};
use murmur_transcript::OutputEnvelope;

use crate::PipelineError;

/// Sequences one transcription run: resolve the source, load the engine,
/// transcribe, report, clean up. Every failure is folded into the failure
/// envelope; callers only ever see an exit code.
pub struct TranscriptionPipeline {
    resolver: SourceResolver,
    loader: Box<dyn EngineLoader>,
    options: TranscriptionOptions,
}

impl TranscriptionPipeline {
    pub fn new(loader: Box<dyn EngineLoader>, options: TranscriptionOptions) -> Self {
        Self {
            resolver: SourceResolver::new(),
            loader,
            options,
        }
    }

    /// Run the pipeline for one source string.
    ///
    /// The envelope is written to `out` before any cleanup, so the caller
    /// receives output even when cleanup fails. Returns the process exit
    /// code: 0 for a transcription, 1 for any failure.
    pub async fn run<W: Write>(&self, source: &str, out: &mut W) -> i32 {
        let started = Instant::now();
        let mut resolved: Option<ResolvedAudio> = None;

        let outcome = self.execute(source, &mut resolved).await;

        let (envelope, mut exit_code) = match outcome {
            Ok(segments) => (OutputEnvelope::success(segments), 0),
            Err(e) => {
                tracing::error!(error = %e, "Transcription run failed");
                (OutputEnvelope::failure(e.to_string()), 1)
            }
        };

        if let Err(e) = writeln!(out, "{}", envelope.to_json()) {
            tracing::error!(error = %e, "Failed to write output");
            exit_code = 1;
        }

        if let Some(resolved) = resolved {
            resolved.cleanup();
        }

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            exit_code,
            "Transcription finished"
        );

        exit_code
    }

    async fn execute(
        &self,
        source: &str,
        resolved_out: &mut Option<ResolvedAudio>,
    ) -> Result<Vec<Segment>, PipelineError> {
        let source = AudioSource::classify(source);
        let resolved = self.resolver.resolve(&source).await?;
        let audio_path = resolved.path().to_path_buf();
        *resolved_out = Some(resolved);

        tracing::info!(
            model_size = %self.options.model_size,
            device = %self.options.device,
            compute_type = %self.options.compute_type,
            "Loading model"
        );
        let engine = self.loader.load(&self.options).await?;
        tracing::info!(model = engine.model_name(), "Model loaded");

        tracing::info!(path = %audio_path.display(), "Transcribing audio file");
        let transcription =
            tokio::task::spawn_blocking(move || engine.transcribe_file(&audio_path))
                .await
                .map_err(|e| PipelineError::Internal(e.to_string()))??;

        let meta = &transcription.metadata;
        tracing::info!(
            language = %meta.language,
            language_probability = meta.language_probability,
            duration_secs = meta.duration_secs,
            segments = transcription.segments.len(),
            "Transcription complete"
        );

        Ok(transcription.segments)
    }
}
