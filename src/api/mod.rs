//! HTTP server module
//!
//! Serves the upload form, accepts submissions and renders the confirmation
//! and error pages.

use crate::{Result, TransferService};
use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod routes;
pub mod state;
pub mod views;

pub use state::AppState;

/// Create the router with all route definitions
///
/// # Routes
///
/// ## Form
/// - `GET /` - Redirect to the form
/// - `GET /images`, `GET /images/` - Upload form
/// - `POST /images`, `POST /images/` - Submit an image URL (`image_url` form field)
///
/// ## Confirmation
/// - `GET /uploaded_image` - Direct upload result (`name`, `source`, `destination`)
/// - `GET /request_received` - Queued request (`name`, `source`, `dest_base_url`, `dest_img_name`)
///
/// ## System
/// - `GET /health` - Health check
pub fn create_router(service: Arc<TransferService>) -> Router {
    let state = AppState::new(service);

    Router::new()
        .route("/", get(routes::index))
        .route("/images", get(routes::show_form).post(routes::submit_form))
        .route("/images/", get(routes::show_form).post(routes::submit_form))
        .route("/uploaded_image", get(routes::uploaded_image))
        .route("/request_received", get(routes::request_received))
        .route("/health", get(routes::health_check))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Start the HTTP server on the configured bind address.
///
/// Creates the download directory, binds the listener and serves until a
/// termination signal arrives.
///
/// # Example
///
/// ```no_run
/// use image_relay::{Config, TransferService};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::from_env()?);
/// let service = Arc::new(TransferService::from_config(config).await?);
///
/// // Blocks until SIGTERM / Ctrl+C
/// image_relay::api::start_server(service).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(service: Arc<TransferService>) -> Result<()> {
    let bind_address = service.config().server.bind_address();

    service.ensure_download_dir().await?;

    tracing::info!(
        address = %bind_address,
        mode = service.config().mode.label(),
        bucket = %service.config().storage.bucket,
        "Starting server"
    );

    let app = create_router(service);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(|e| crate::error::Error::Server(format!("failed to bind {bind_address}: {e}")))?;

    tracing::info!(address = %bind_address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::wait_for_signal())
        .await
        .map_err(|e| crate::error::Error::Server(e.to_string()))?;

    tracing::info!("Server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
