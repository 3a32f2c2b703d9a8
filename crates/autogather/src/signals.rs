//! Signal handling for graceful shutdown.
//!
//! The event loop selects on [`shutdown_signal`] alongside its input, so a
//! signal stops the loop between two callbacks and the cache is saved once on
//! the way out.

use tokio::signal;
use tracing::info;

/// Completes when the process receives a termination signal.
///
/// # Platform Support
///
/// * **Unix platforms**: SIGINT and SIGTERM
/// * **Windows**: Ctrl+C
pub async fn shutdown_signal() -> Result<(), std::io::Error> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(windows)]
    signal::ctrl_c().await?;

    info!("📡 Received shutdown signal - saving and exiting");
    Ok(())
}
