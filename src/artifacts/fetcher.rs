//! Concurrent artifact download.
//!
//! # Responsibilities
//! - Skip artifacts already present at their target path
//! - Stream missing artifacts to `<name>.part` with a bounded timeout, then
//!   rename into place, so an interrupted download never looks present
//! - Remove partial files when a download fails or was cut short earlier
//! - Mark the executables runnable

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::future::join_all;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use url::Url;

use crate::artifacts::manifest::{manifest_for, ArchBucket, ArtifactSpec};
use crate::observability::metrics;

/// Connect plus transfer window for one download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
/// Suffix of the file a download streams into before it is complete.
pub const PARTIAL_SUFFIX: &str = ".part";
/// Write buffer size used while streaming to disk.
pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

#[cfg(unix)]
const EXECUTABLE_MODE: u32 = 0o775;

/// Failure of a single download.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to make every required artifact available.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid artifact URL: {0}")]
    Manifest(#[from] url::ParseError),

    #[error("artifacts not ready: {}", .missing.join(", "))]
    Incomplete { missing: Vec<String> },
}

/// Ensures the executables exist in the working directory.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    work_dir: PathBuf,
    client: reqwest::Client,
    manifest: Option<Vec<ArtifactSpec>>,
}

impl ArtifactFetcher {
    pub fn new(work_dir: impl Into<PathBuf>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            work_dir: work_dir.into(),
            client,
            manifest: None,
        })
    }

    /// Replace the architecture manifest, e.g. with a local mirror.
    pub fn with_manifest(mut self, manifest: Vec<ArtifactSpec>) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Make every artifact of the manifest for `bucket` available.
    pub async fn ensure(&self, bucket: ArchBucket) -> Result<(), FetchError> {
        let manifest = match &self.manifest {
            Some(manifest) => manifest.clone(),
            None => manifest_for(bucket)?,
        };
        tracing::debug!(arch = %bucket, artifacts = manifest.len(), "Ensuring artifacts");
        self.ensure_manifest(&manifest).await
    }

    /// Download whatever is missing from `manifest`, concurrently.
    ///
    /// Artifacts already on disk are never downloaded again.
    pub async fn ensure_manifest(&self, manifest: &[ArtifactSpec]) -> Result<(), FetchError> {
        for spec in manifest {
            remove_if_exists(&self.partial(&spec.name)).await;
        }

        let mut pending = Vec::new();
        for spec in manifest {
            if self.is_present(&spec.name).await {
                tracing::debug!(artifact = %spec.name, "Artifact already present");
            } else {
                pending.push(spec);
            }
        }

        if !pending.is_empty() {
            join_all(pending.into_iter().map(|spec| self.download(spec))).await;
        }

        let mut missing = Vec::new();
        for spec in manifest {
            if !self.is_present(&spec.name).await {
                missing.push(spec.name.clone());
            }
        }
        if !missing.is_empty() {
            return Err(FetchError::Incomplete { missing });
        }

        for spec in manifest {
            self.mark_executable(&self.target(&spec.name)).await;
        }
        Ok(())
    }

    fn target(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    fn partial(&self, name: &str) -> PathBuf {
        self.work_dir.join(format!("{name}{PARTIAL_SUFFIX}"))
    }

    async fn is_present(&self, name: &str) -> bool {
        fs::try_exists(self.target(name)).await.unwrap_or(false)
    }

    async fn download(&self, spec: &ArtifactSpec) -> bool {
        let partial = self.partial(&spec.name);
        let target = self.target(&spec.name);

        let result = match self.stream_to(&spec.url, &partial).await {
            Ok(bytes) => fs::rename(&partial, &target)
                .await
                .map(|()| bytes)
                .map_err(DownloadError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(bytes) => {
                tracing::info!(artifact = %spec.name, bytes, "Artifact downloaded");
                metrics::record_download(&spec.name, "success");
                true
            }
            Err(e) => {
                tracing::error!(artifact = %spec.name, url = %spec.url, error = %e, "Artifact download failed");
                metrics::record_download(&spec.name, "failure");
                remove_if_exists(&partial).await;
                false
            }
        }
    }

    async fn stream_to(&self, url: &Url, target: &Path) -> Result<u64, DownloadError> {
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;

        let file = fs::File::create(target).await?;
        let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
        let mut body = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;

        Ok(written)
    }

    #[cfg(unix)]
    async fn mark_executable(&self, path: &Path) {
        use std::os::unix::fs::PermissionsExt;

        let permissions = std::fs::Permissions::from_mode(EXECUTABLE_MODE);
        if let Err(e) = fs::set_permissions(path, permissions).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to set artifact permissions");
        }
    }

    #[cfg(not(unix))]
    async fn mark_executable(&self, _path: &Path) {}
}

async fn remove_if_exists(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial download");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_manifest() -> Vec<ArtifactSpec> {
        vec![
            ArtifactSpec::new("front", Url::parse("http://127.0.0.1:1/front").unwrap()),
            ArtifactSpec::new("backend", Url::parse("http://127.0.0.1:1/backend").unwrap()),
        ]
    }

    #[tokio::test]
    async fn test_present_artifacts_skip_network() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("front"), b"front-bin").unwrap();
        std::fs::write(dir.path().join("backend"), b"backend-bin").unwrap();

        let fetcher = ArtifactFetcher::new(dir.path()).unwrap();
        fetcher.ensure_manifest(&unreachable_manifest()).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("front")).unwrap(), b"front-bin");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_present_artifacts_become_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("front"), b"").unwrap();
        std::fs::write(dir.path().join("backend"), b"").unwrap();

        let fetcher = ArtifactFetcher::new(dir.path()).unwrap();
        fetcher.ensure_manifest(&unreachable_manifest()).await.unwrap();

        let mode = std::fs::metadata(dir.path().join("backend"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o775);
    }

    #[tokio::test]
    async fn test_unreachable_mirror_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("front"), b"front-bin").unwrap();

        let fetcher = ArtifactFetcher::new(dir.path()).unwrap();
        let err = fetcher
            .ensure_manifest(&unreachable_manifest())
            .await
            .unwrap_err();

        match err {
            FetchError::Incomplete { missing } => assert_eq!(missing, vec!["backend".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("backend").exists());
    }

    #[tokio::test]
    async fn test_leftover_partial_is_discarded_and_not_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("front"), b"front-bin").unwrap();
        std::fs::write(dir.path().join("backend.part"), b"trunc").unwrap();

        let fetcher = ArtifactFetcher::new(dir.path()).unwrap();
        let err = fetcher
            .ensure_manifest(&unreachable_manifest())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Incomplete { .. }));
        assert!(!dir.path().join("backend.part").exists());
        assert!(!dir.path().join("backend").exists());
    }
}
