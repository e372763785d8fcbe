//! Signal handling for graceful shutdown.

use anyhow::Result;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::info;

/// Set up signal handlers for graceful shutdown.
///
/// Returns a receiver that fires when SIGTERM or SIGINT is received.
pub fn setup_signal_handlers() -> Result<mpsc::Receiver<()>> {
    let (tx, rx) = mpsc::channel(1);
    let mut term = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = term.recv() => info!("Received SIGTERM"),
            _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
        }
        let _ = tx.send(()).await;
    });

    Ok(rx)
}
