//! # image-relay
//!
//! Small web service that copies images from arbitrary URLs into an S3 bucket.
//!
//! A visitor submits an image URL through a form. Depending on the configured
//! [`TransferMode`] the service either:
//! - **direct** - downloads the image, uploads it to the bucket under a
//!   deterministic key (`md5(url)-basename`) and deletes the local copy, or
//! - **queue** - publishes a [`TransferJob`] to a work queue and returns
//!   immediately, leaving the copy to an external consumer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use image_relay::{Config, TransferService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::new("my-bucket"));
//!     let service = TransferService::from_config(config).await?;
//!
//!     let outcome = service.submit("https://example.com/cat.png").await?;
//!     println!("redirect to {}", outcome.redirect_target());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP server and form handlers
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Tracing subscriber setup
pub mod logging;
/// Local file naming
pub mod naming;
/// Work queue for deferred transfers
pub mod queue;
/// Object storage
pub mod storage;
/// Transfer pipeline
pub mod transfer;

// Re-export commonly used types
pub use config::{Config, ServerConfig, StorageConfig, TransferMode};
pub use error::{Error, FetchError, QueueError, Result, StorageError, ToHttpStatus};
pub use queue::{SqsQueue, TransferJob, WorkQueue};
pub use storage::{ObjectStore, S3Store};
pub use transfer::{
    CompletedTransfer, QueuedTransfer, TransferOutcome, TransferRequest, TransferService,
};

/// Wait until the process is asked to stop.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

/// Wait until the process is asked to stop (Ctrl+C).
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
