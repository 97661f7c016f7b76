//! Route handlers for the web form
//!
//! Handlers are organized by domain:
//! - [`images`] - upload form, submission and confirmation pages
//! - [`system`] - health

use serde::{Deserialize, Serialize};

mod images;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use images::*;
pub use system::*;

// ============================================================================
// Form/Query Types (shared across handlers)
// ============================================================================

/// Body of POST /images
#[derive(Debug, Deserialize, Serialize)]
pub struct ImageForm {
    /// Source image URL; a missing field is treated like an empty one
    #[serde(default)]
    pub image_url: String,
}

/// Query parameters for GET /uploaded_image
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UploadedQuery {
    /// Object key / local name
    #[serde(default)]
    pub name: String,
    /// Source image URL
    #[serde(default)]
    pub source: String,
    /// Public URL of the uploaded object
    #[serde(default)]
    pub destination: String,
}

/// Query parameters for GET /request_received
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ReceivedQuery {
    /// Object key / local name
    #[serde(default)]
    pub name: String,
    /// Source image URL
    #[serde(default)]
    pub source: String,
    /// Public base URL of the bucket
    #[serde(default)]
    pub dest_base_url: String,
    /// Object key the consumer will upload to
    #[serde(default)]
    pub dest_img_name: String,
}
