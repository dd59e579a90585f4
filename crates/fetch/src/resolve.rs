use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::{Result, SourceError};

/// Connect and read timeout for remote fetches. No retries are attempted:
/// a transient failure fails the run.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A user-supplied audio source, classified once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    Remote(String),
    Local(PathBuf),
}

impl AudioSource {
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Remote(raw.to_string())
        } else {
            Self::Local(PathBuf::from(raw))
        }
    }
}

/// A local, readable audio path, plus ownership of the backing temp file
/// when the source was remote.
///
/// A temporary file is deleted when this value is dropped; [`cleanup`]
/// deletes it too but reports failure. Either way deletion runs exactly
/// once, on every exit path.
///
/// [`cleanup`]: ResolvedAudio::cleanup
#[derive(Debug)]
pub struct ResolvedAudio {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl ResolvedAudio {
    fn local(path: PathBuf) -> Self {
        Self { path, temp: None }
    }

    fn temporary(temp: TempPath) -> Self {
        Self {
            path: temp.to_path_buf(),
            temp: Some(temp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Delete the temp file, if any. Failure is logged, never fatal: by the
    /// time this runs the transcript has already been written.
    pub fn cleanup(self) {
        let Self { path, temp } = self;
        if let Some(temp) = temp {
            match temp.close() {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "Removed temporary audio file");
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to remove temporary audio file"
                    );
                }
            }
        }
    }
}

/// Turns a source string into a local readable path, downloading remote
/// sources to a uniquely named temp file.
pub struct SourceResolver {
    client: reqwest::Client,
}

impl SourceResolver {
    pub fn new() -> Self {
        // Timeouts bound each connect and read, not the whole transfer:
        // remote audio can be arbitrarily large.
        let client = reqwest::Client::builder()
            .connect_timeout(FETCH_TIMEOUT)
            .read_timeout(FETCH_TIMEOUT)
            .build()
            .expect("default reqwest client");
        Self { client }
    }

    pub async fn resolve(&self, source: &AudioSource) -> Result<ResolvedAudio> {
        match source {
            AudioSource::Local(path) => {
                let readable = std::fs::metadata(path)
                    .map(|meta| meta.is_file())
                    .unwrap_or(false);
                if !readable {
                    return Err(SourceError::NotFound(path.display().to_string()));
                }
                Ok(ResolvedAudio::local(path.clone()))
            }
            AudioSource::Remote(url) => self.download(url).await,
        }
    }

    async fn download(&self, url: &str) -> Result<ResolvedAudio> {
        tracing::info!(url, "Downloading audio");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::DownloadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::DownloadFailed(format!(
                "HTTP {}: {}",
                response.status(),
                url
            )));
        }

        // The suffix is kept as a format hint for the engine. If the stream
        // fails mid-body, dropping `temp` removes the partial file.
        let temp = tempfile::Builder::new()
            .prefix("murmur-audio-")
            .suffix(&url_suffix(url))
            .tempfile()?
            .into_temp_path();

        let mut file = tokio::fs::File::create(&*temp).await?;
        let mut stream = response.bytes_stream();
        let mut total = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| SourceError::DownloadFailed(e.to_string()))?;
            file.write_all(&chunk).await?;
            total += chunk.len() as u64;
        }

        file.flush().await?;

        tracing::info!(
            url,
            bytes = total,
            path = %temp.display(),
            "Audio downloaded to temporary file"
        );

        Ok(ResolvedAudio::temporary(temp))
    }
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension of the URL's path component, `.tmp` when it has none.
fn url_suffix(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            Path::new(parsed.path())
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| format!(".{ext}"))
        })
        .unwrap_or_else(|| ".tmp".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_splits_on_scheme_prefix() {
        assert_eq!(
            AudioSource::classify("https://example.com/a.mp3"),
            AudioSource::Remote("https://example.com/a.mp3".to_string())
        );
        assert_eq!(
            AudioSource::classify("http://example.com/a.mp3"),
            AudioSource::Remote("http://example.com/a.mp3".to_string())
        );
        assert_eq!(
            AudioSource::classify("/tmp/sample.wav"),
            AudioSource::Local(PathBuf::from("/tmp/sample.wav"))
        );
        // Not a URL scheme we fetch; treated as a (strange) local path.
        assert_eq!(
            AudioSource::classify("ftp://example.com/a.mp3"),
            AudioSource::Local(PathBuf::from("ftp://example.com/a.mp3"))
        );
    }

    #[test]
    fn url_suffix_comes_from_the_path_only() {
        assert_eq!(url_suffix("https://example.com/audio/talk.mp3"), ".mp3");
        assert_eq!(
            url_suffix("https://example.com/talk.ogg?token=abc.def"),
            ".ogg"
        );
        assert_eq!(url_suffix("https://example.com/stream"), ".tmp");
    }

    #[tokio::test]
    async fn local_file_resolves_in_place() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = AudioSource::Local(file.path().to_path_buf());

        let resolved = SourceResolver::new().resolve(&source).await.unwrap();
        assert_eq!(resolved.path(), file.path());
        assert!(!resolved.is_temporary());

        // Cleanup of a local resolution must not touch the file.
        resolved.cleanup();
        assert!(file.path().exists());
    }

    #[tokio::test]
    async fn missing_local_file_is_not_found() {
        let source = AudioSource::Local(PathBuf::from("/no/such/file.wav"));
        let err = SourceResolver::new().resolve(&source).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
        assert!(err.to_string().contains("/no/such/file.wav"));
    }

    #[tokio::test]
    async fn directory_is_not_a_readable_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = AudioSource::Local(dir.path().to_path_buf());
        let err = SourceResolver::new().resolve(&source).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn temporary_resolution_deletes_on_cleanup() {
        let temp = tempfile::Builder::new()
            .prefix("murmur-audio-")
            .suffix(".wav")
            .tempfile()
            .unwrap()
            .into_temp_path();
        let path = temp.to_path_buf();

        let resolved = ResolvedAudio::temporary(temp);
        assert!(resolved.is_temporary());
        assert!(path.exists());

        resolved.cleanup();
        assert!(!path.exists());
    }

    #[test]
    fn temporary_resolution_deletes_on_drop() {
        let temp = tempfile::Builder::new()
            .prefix("murmur-audio-")
            .suffix(".tmp")
            .tempfile()
            .unwrap()
            .into_temp_path();
        let path = temp.to_path_buf();

        drop(ResolvedAudio::temporary(temp));
        assert!(!path.exists());
    }
}
