use crate::{is_downloaded, model_path, ModelError, Result, WhisperModel};
use futures::StreamExt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Fetch the model bundle if it is not already on disk.
///
/// Returns the model directory. `on_progress` receives cumulative and total
/// byte counts while the archive streams in.
pub async fn ensure_downloaded<F>(model: WhisperModel, on_progress: F) -> Result<PathBuf>
where
    F: Fn(u64, u64),
{
    let model_dir = model_path(model);

    if is_downloaded(model) {
        return Ok(model_dir);
    }

    std::fs::create_dir_all(&model_dir)?;

    let url = model.archive_url();
    let total_size = model.size_bytes();
    let mut downloaded = 0u64;

    tracing::info!(model = model.name(), url = %url, "Downloading Whisper ONNX bundle");

    let temp_archive = model_dir.join("bundle.tar.bz2");
    download_file(&url, &temp_archive, |chunk_size| {
        downloaded += chunk_size;
        on_progress(downloaded, total_size);
    })
    .await?;

    tracing::info!(model = model.name(), "Extracting Whisper ONNX bundle");
    extract_bundle(&temp_archive, &model_dir)?;

    let _ = std::fs::remove_file(&temp_archive);

    Ok(model_dir)
}

/// Unpack the tar.bz2 bundle, stripping the archive's top-level directory
/// and skipping its sample audio.
fn extract_bundle(archive_path: &Path, model_dir: &Path) -> Result<()> {
    let archive_file = std::fs::File::open(archive_path)?;
    let decoder = bzip2::read::BzDecoder::new(archive_file);
    let mut archive = tar::Archive::new(decoder);

    for entry in archive
        .entries()
        .map_err(|e| ModelError::ExtractFailed(e.to_string()))?
    {
        let mut entry = entry.map_err(|e| ModelError::ExtractFailed(e.to_string()))?;
        let path = entry
            .path()
            .map_err(|e| ModelError::ExtractFailed(e.to_string()))?;

        // Strip the top-level directory (e.g., "sherpa-onnx-whisper-small/")
        let components: Vec<_> = path.components().collect();
        if components.len() <= 1 {
            continue;
        }
        let relative_path: PathBuf = components[1..].iter().collect();

        if relative_path.starts_with("test_wavs") {
            continue;
        }

        let dest_path = model_dir.join(&relative_path);

        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if entry.header().entry_type().is_file() {
            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|e| ModelError::ExtractFailed(e.to_string()))?;
            std::fs::write(&dest_path, &content)?;
            tracing::debug!(file = %relative_path.display(), "Extracted");
        }
    }

    Ok(())
}

pub(crate) async fn download_file<F>(url: &str, dest: &Path, mut on_chunk: F) -> Result<u64>
where
    F: FnMut(u64),
{
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ModelError::DownloadFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ModelError::DownloadFailed(format!(
            "HTTP {}: {}",
            response.status(),
            url
        )));
    }

    let mut file = tokio::fs::File::create(dest).await.map_err(ModelError::Io)?;

    let mut stream = response.bytes_stream();
    let mut total = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ModelError::DownloadFailed(e.to_string()))?;
        file.write_all(&chunk).await.map_err(ModelError::Io)?;
        total += chunk.len() as u64;
        on_chunk(chunk.len() as u64);
    }

    file.flush().await.map_err(ModelError::Io)?;

    Ok(total)
}
