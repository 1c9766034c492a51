//! Child process supervision.
//!
//! # Responsibilities
//! - Launch the front and backend executables
//! - Own the set of live process handles
//! - Report liveness to the status surface
//! - Terminate everything on shutdown: SIGTERM, bounded wait, then kill
//!
//! # Design Decisions
//! - The live set sits behind a short-lived `std::sync::Mutex`; no lock is
//!   held across an `.await`
//! - Teardown errors are logged and swallowed, never returned
//! - `terminate_all` drains the set, so repeated calls are no-ops

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;

use crate::observability::metrics;
use crate::process::backend::BackendMode;
use crate::process::external::{ExternalProcess, ProcessLauncher};

/// Time a process gets to exit after SIGTERM before it is killed.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(5);
/// Time allowed to reap a process after it has been killed.
const KILL_REAP_TIMEOUT: Duration = Duration::from_secs(1);

/// Which managed executable a process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessTag {
    Front,
    Backend,
}

impl fmt::Display for ProcessTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessTag::Front => write!(f, "front"),
            ProcessTag::Backend => write!(f, "backend"),
        }
    }
}

/// Failure to start a managed process.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{} executable not found at {}", .tag, .path.display())]
    Missing { tag: ProcessTag, path: PathBuf },

    #[error("failed to spawn {tag}: {source}")]
    Spawn {
        tag: ProcessTag,
        #[source]
        source: std::io::Error,
    },
}

/// What a successful launch reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchedProcess {
    pub tag: ProcessTag,
    pub pid: Option<u32>,
}

/// A live child process and its tag.
pub struct ManagedProcess {
    pub tag: ProcessTag,
    handle: Box<dyn ExternalProcess>,
}

impl fmt::Debug for ManagedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedProcess")
            .field("tag", &self.tag)
            .field("pid", &self.handle.id())
            .finish()
    }
}

/// Launches, tracks and terminates the front and backend processes.
pub struct ProcessSupervisor {
    launcher: Arc<dyn ProcessLauncher>,
    live: Mutex<Vec<ManagedProcess>>,
    grace: Duration,
}

impl ProcessSupervisor {
    pub fn new(launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            launcher,
            live: Mutex::new(Vec::new()),
            grace: TERMINATE_GRACE,
        }
    }

    /// Override the SIGTERM grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Start the front executable as `<path> -c <config_path>`.
    pub fn launch_front(&self, path: &Path, config_path: &Path) -> Result<LaunchedProcess, LaunchError> {
        let args = vec!["-c".to_string(), config_path.display().to_string()];
        self.launch(ProcessTag::Front, path, &args)
    }

    /// Start the backend executable in `mode`.
    pub fn launch_backend(&self, path: &Path, mode: &BackendMode) -> Result<LaunchedProcess, LaunchError> {
        tracing::info!(mode = mode.name(), "Starting backend");
        self.launch(ProcessTag::Backend, path, &mode.args())
    }

    fn launch(&self, tag: ProcessTag, path: &Path, args: &[String]) -> Result<LaunchedProcess, LaunchError> {
        if !path.exists() {
            return Err(LaunchError::Missing {
                tag,
                path: path.to_path_buf(),
            });
        }

        let handle = self
            .launcher
            .spawn(path, args)
            .map_err(|source| LaunchError::Spawn { tag, source })?;
        let pid = handle.id();

        let tracked = {
            let mut live = self.lock_live();
            live.push(ManagedProcess { tag, handle });
            live.len()
        };
        metrics::set_managed_processes(tracked);

        tracing::info!(process = %tag, pid = ?pid, "Process started");
        Ok(LaunchedProcess { tag, pid })
    }

    /// Whether a tracked process with `tag` is still alive.
    pub fn is_running(&self, tag: ProcessTag) -> bool {
        self.lock_live()
            .iter_mut()
            .any(|p| p.tag == tag && !p.handle.has_exited())
    }

    /// Number of tracked handles, alive or not.
    pub fn tracked(&self) -> usize {
        self.lock_live().len()
    }

    /// Stop every tracked process and clear the set.
    ///
    /// Safe on an empty set, on repeated calls and on processes that have
    /// already exited.
    pub async fn terminate_all(&self) {
        let processes = std::mem::take(&mut *self.lock_live());
        if processes.is_empty() {
            return;
        }

        tracing::info!(count = processes.len(), "Terminating managed processes");
        for mut process in processes {
            self.stop(&mut process).await;
        }
        metrics::set_managed_processes(0);
    }

    async fn stop(&self, process: &mut ManagedProcess) {
        let tag = process.tag;
        if process.handle.has_exited() {
            tracing::debug!(process = %tag, "Process already exited");
            return;
        }

        if let Err(e) = process.handle.terminate() {
            tracing::debug!(process = %tag, error = %e, "Terminate signal failed");
        }

        match timeout(self.grace, process.handle.wait()).await {
            Ok(Ok(())) => {
                tracing::info!(process = %tag, "Process stopped");
                return;
            }
            Ok(Err(e)) => tracing::warn!(process = %tag, error = %e, "Waiting for process failed"),
            Err(_) => tracing::warn!(process = %tag, grace = ?self.grace, "Process ignored terminate, killing"),
        }

        if let Err(e) = process.handle.kill() {
            tracing::debug!(process = %tag, error = %e, "Kill failed");
        }
        match timeout(KILL_REAP_TIMEOUT, process.handle.wait()).await {
            Ok(Ok(())) => tracing::info!(process = %tag, "Process killed"),
            Ok(Err(e)) => tracing::warn!(process = %tag, error = %e, "Reaping killed process failed"),
            Err(_) => tracing::warn!(process = %tag, "Killed process did not exit in time"),
        }
    }

    fn lock_live(&self) -> MutexGuard<'_, Vec<ManagedProcess>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("tracked", &self.tracked())
            .field("grace", &self.grace)
            .finish()
    }
}
