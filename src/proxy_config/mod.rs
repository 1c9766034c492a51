//! Front process configuration generation.
//!
//! # Data Flow
//! ```text
//! ServiceConfig
//!     → document.rs (ProxyConfigDocument, pure)
//!     → pretty JSON
//!     → <work_dir>/config.json (overwritten every run)
//! ```
//!
//! The front binary reads the file once at its own startup; there is no
//! reload contract.

pub mod document;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::fs;

use crate::config::ServiceConfig;

pub use document::ProxyConfigDocument;

/// Failure to produce the front configuration file.
#[derive(Debug, Error)]
pub enum WriteConfigError {
    #[error("failed to serialize front config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Produces `config.json` for the front process.
#[derive(Debug, Clone)]
pub struct ConfigGenerator {
    config: Arc<ServiceConfig>,
}

impl ConfigGenerator {
    pub fn new(config: Arc<ServiceConfig>) -> Self {
        Self { config }
    }

    /// The document and its file contents. Byte-identical for an unchanged
    /// config.
    pub fn render(&self) -> Result<(ProxyConfigDocument, String), serde_json::Error> {
        let document = ProxyConfigDocument::from_service_config(&self.config);
        let rendered = serde_json::to_string_pretty(&document)?;
        Ok((document, rendered))
    }

    /// Render the document and write it to `<work_dir>/config.json`.
    pub async fn generate(&self) -> Result<ProxyConfigDocument, WriteConfigError> {
        let (document, rendered) = self.render()?;
        let path = self.config.config_path();

        fs::write(&path, rendered)
            .await
            .map_err(|source| WriteConfigError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!(
            path = %path.display(),
            inbounds = document.inbounds.len(),
            "Front config written"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Arc<ServiceConfig> {
        let mut config = ServiceConfig::default();
        config.work_dir = dir.to_path_buf();
        Arc::new(config)
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ConfigGenerator::new(config_in(dir.path()));

        generator.generate().await.unwrap();
        let first = std::fs::read(dir.path().join("config.json")).unwrap();
        generator.generate().await.unwrap();
        let second = std::fs::read(dir.path().join("config.json")).unwrap();

        assert_eq!(first, second);
        let (_, rendered) = generator.render().unwrap();
        assert_eq!(first, rendered.into_bytes());
    }

    #[tokio::test]
    async fn test_generate_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "stale").unwrap();

        let generator = ConfigGenerator::new(config_in(dir.path()));
        let document = generator.generate().await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        let parsed: ProxyConfigDocument = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, document);
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ConfigGenerator::new(config_in(&dir.path().join("missing")));

        let err = generator.generate().await.unwrap_err();
        assert!(matches!(err, WriteConfigError::Io { .. }));
    }
}
