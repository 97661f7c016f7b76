//! HTML views rendered with askama
//!
//! Templates live in `templates/` at the crate root.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// The upload form
#[derive(Template)]
#[template(path = "images.html")]
pub struct ImagesPage {
    /// Destination bucket, shown under the form
    pub bucket: String,
    /// Whether submissions are queued rather than uploaded inline
    pub queue_mode: bool,
}

/// Confirmation after a direct upload
#[derive(Template)]
#[template(path = "uploaded_image.html")]
pub struct UploadedPage {
    /// Object key
    pub name: String,
    /// Submitted URL
    pub source: String,
    /// Public URL of the object
    pub destination: String,
    /// Only http(s) destinations are linked and previewed
    pub show_preview: bool,
}

/// Confirmation after a job was queued
#[derive(Template)]
#[template(path = "request_received.html")]
pub struct ReceivedPage {
    /// Object key
    pub name: String,
    /// Submitted URL
    pub source: String,
    /// Where the object will be once the consumer has processed it
    pub destination: String,
}

/// Generic error view
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Render a template into a response with the given status
///
/// A template that fails to render becomes a plain-text 500.
pub fn render_page<T: Template>(status: StatusCode, page: &T) -> Response {
    match page.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render template");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
    }
}
