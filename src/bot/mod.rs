//! Bot runtime
//!
//! Single-instance guard, update dispatcher and the two drivers around it:
//! the long-poll loop and the HTTP one-batch endpoint.

pub mod dispatcher;
pub mod http;
pub mod instance;
pub mod poller;

pub use dispatcher::{BatchReport, UpdateDispatcher};
pub use http::HttpState;
pub use instance::InstanceLock;
pub use poller::Poller;

use tracing::{error, info};

/// Resolves on Ctrl+C or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
