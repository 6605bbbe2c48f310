//! Graceful shutdown handling.

use tokio::signal;
use tracing::{info, warn};

/// Wait for Ctrl-C or, on Unix, SIGTERM.
///
/// A handler that cannot be installed is logged and then never fires, so
/// the other signal still works.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(service = "server", event = "shutdown_signal", signal = "SIGINT", "initiating shutdown"),
        _ = terminate => info!(service = "server", event = "shutdown_signal", signal = "SIGTERM", "initiating shutdown"),
    }
}
