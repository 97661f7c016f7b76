//! Application state for the HTTP server

use crate::{Config, TransferService};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the transfer pipeline and the startup configuration.
#[derive(Clone)]
pub struct AppState {
    /// The transfer pipeline
    pub service: Arc<TransferService>,

    /// Configuration, read once at startup
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service: Arc<TransferService>) -> Self {
        let config = service.config().clone();
        Self { service, config }
    }
}
