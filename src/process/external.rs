//! Narrow capability over an OS child process.
//!
//! The supervisor only needs to start, signal, wait for and kill a process,
//! so that is all these traits expose. Tests substitute in-memory fakes.

use std::io;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};

/// A running child process.
#[async_trait]
pub trait ExternalProcess: Send {
    /// OS process id, if the process has not been reaped yet.
    fn id(&self) -> Option<u32>;

    /// Ask the process to exit (SIGTERM on unix).
    fn terminate(&mut self) -> io::Result<()>;

    /// Force the process to exit.
    fn kill(&mut self) -> io::Result<()>;

    /// Whether the process has already exited, without blocking.
    fn has_exited(&mut self) -> bool;

    /// Wait until the process exits.
    async fn wait(&mut self) -> io::Result<()>;
}

/// Starts child processes.
pub trait ProcessLauncher: Send + Sync {
    fn spawn(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn ExternalProcess>>;
}

/// Launcher backed by `tokio::process`.
///
/// Standard streams are discarded; children are killed if their handle is
/// dropped without an orderly shutdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn spawn(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn ExternalProcess>> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        Ok(Box::new(TokioProcess { child }))
    }
}

/// `tokio::process::Child` as an [`ExternalProcess`].
#[derive(Debug)]
pub struct TokioProcess {
    child: Child,
}

#[async_trait]
impl ExternalProcess for TokioProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> io::Result<()> {
        // Already reaped: nothing to signal.
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        let pid = libc::pid_t::try_from(pid)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        // SAFETY: kill(2) has no memory-safety preconditions.
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }

    fn has_exited(&mut self) -> bool {
        !matches!(self.child.try_wait(), Ok(None))
    }

    async fn wait(&mut self) -> io::Result<()> {
        self.child.wait().await.map(|_| ())
    }
}
