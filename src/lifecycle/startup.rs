//! Working directory preparation.

use std::io;
use std::path::Path;

use tokio::fs;

use crate::config::ServiceConfig;

/// Create the working directory and clear files left by a previous run.
///
/// Only a failure to create the directory is reported; stale-file cleanup
/// errors are logged and ignored.
pub async fn prepare_work_dir(config: &ServiceConfig) -> io::Result<()> {
    let dir = config.work_dir();
    if !fs::try_exists(dir).await.unwrap_or(false) {
        fs::create_dir_all(dir).await?;
        tracing::info!(path = %dir.display(), "Created working directory");
    }

    for stale in [config.subscription_path(), config.boot_log_path()] {
        remove_stale(&stale).await;
    }
    Ok(())
}

async fn remove_stale(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed stale file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove stale file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServiceConfig::default();
        config.work_dir = dir.path().join("a").join("b");

        prepare_work_dir(&config).await.unwrap();
        assert!(config.work_dir.is_dir());
    }

    #[tokio::test]
    async fn test_removes_stale_outputs_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServiceConfig::default();
        config.work_dir = dir.path().to_path_buf();
        std::fs::write(config.subscription_path(), "old").unwrap();
        std::fs::write(config.boot_log_path(), "old").unwrap();
        std::fs::write(config.artifact_path("front"), "binary").unwrap();

        prepare_work_dir(&config).await.unwrap();

        assert!(!config.subscription_path().exists());
        assert!(!config.boot_log_path().exists());
        assert!(config.artifact_path("front").exists());
    }
}
