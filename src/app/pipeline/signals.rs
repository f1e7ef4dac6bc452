//! Interrupt handling for install runs
//!
//! A run is raced against [`shutdown_signal`]; when the signal wins, the
//! in-flight lookup or download is dropped on the spot and the overlay merge
//! never starts.

use std::future::Future;

use tokio::signal;
use tracing::info;

use crate::errors::{AppError, Result};

/// Resolves on Ctrl+C, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        info!("Ctrl+C signal received");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("SIGTERM signal received");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Runs `work` unless `shutdown` completes first
///
/// # Errors
///
/// Returns `AppError::Interrupted` if `shutdown` wins the race, otherwise
/// whatever `work` returns
pub async fn run_until_interrupted<T, W, S>(work: W, shutdown: S) -> Result<T>
where
    W: Future<Output = Result<T>>,
    S: Future<Output = ()>,
{
    tokio::select! {
        result = work => result,
        _ = shutdown => Err(AppError::Interrupted),
    }
}
