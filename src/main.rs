//! image-relay server binary
//!
//! Reads configuration from the environment (and `.env` when present), then
//! serves the upload form until SIGTERM / Ctrl+C.

use image_relay::{Config, TransferService, api, logging};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init_logging();

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let service = match TransferService::from_config(config).await {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize transfer service");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = api::start_server(service).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
