//! OS signal handling.

use std::io;

/// Resolves on SIGINT or SIGTERM (Ctrl+C on non-unix platforms).
pub async fn wait_for_signal() -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "Shutdown signal received"),
            _ = sigint.recv() => tracing::info!(signal = "SIGINT", "Shutdown signal received"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!(signal = "ctrl_c", "Shutdown signal received");
    }

    Ok(())
}
