use std::io::Write;

use clap::Parser;
use murmur_application::TranscriptionPipeline;
use murmur_sherpa::WhisperLoader;
use murmur_stt::TranscriptionOptions;
use tracing_subscriber::EnvFilter;

/// Transcribe an audio file or URL to timestamped JSON on stdout.
#[derive(Parser)]
#[command(name = "murmur", version)]
struct Cli {
    /// Path or URL of the audio to transcribe.
    audio_source: String,

    /// Whisper model variant (tiny, base, small, medium, large-v3, turbo).
    #[arg(long, default_value = "large-v3")]
    model_size: String,

    /// Inference device (auto, cpu, cuda, coreml).
    #[arg(long, default_value = "auto")]
    device: String,

    /// Model precision (auto, int8, fp32).
    #[arg(long, default_value = "auto")]
    compute_type: String,

    /// Language code to decode with (e.g. en, es), or auto to let the model detect.
    #[arg(long, default_value = "auto")]
    language: String,
}

#[tokio::main]
async fn main() {
    // stdout carries exactly one JSON document per run; everything
    // diagnostic goes to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let options = TranscriptionOptions {
        model_size: cli.model_size,
        device: cli.device,
        compute_type: cli.compute_type,
        language: cli.language,
    };

    tracing::info!(
        model_size = %options.model_size,
        device = %options.device,
        compute_type = %options.compute_type,
        "Starting transcription"
    );

    let pipeline = TranscriptionPipeline::new(Box::new(WhisperLoader), options);

    let mut stdout = std::io::stdout();
    let code = pipeline.run(&cli.audio_source, &mut stdout).await;
    let _ = stdout.flush();

    std::process::exit(code);
}
