//! Signal handling for the interactive payment session.

use motbook_core::events::{ModalEvent, ModalEventSender};
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;

/// Completes when SIGTERM or SIGINT (Ctrl+C) is received.
///
/// Returns the name of the signal.
pub async fn shutdown_signal() -> std::io::Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Spawns a task that closes the payment modal on the first shutdown signal.
///
/// Closing goes through the session like the close button does, so an
/// order awaiting approval is cancelled before the process exits.
pub fn spawn_close_on_signal(modal_tx: ModalEventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(name) => {
                tracing::info!(signal = name, "Received shutdown signal, closing payment session");
                if modal_tx.send(ModalEvent::Close).await.is_err() {
                    tracing::debug!("Payment session already finished");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handlers");
            }
        }
    })
}
