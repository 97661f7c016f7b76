//! Upload form, submission and confirmation handlers.

use super::{ImageForm, ReceivedQuery, UploadedQuery};
use crate::api::AppState;
use crate::api::views::{ImagesPage, ReceivedPage, UploadedPage, render_page};
use crate::config::TransferMode;
use crate::error::Result;
use crate::storage::join_key;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Redirect, Response},
};

/// GET / - Send visitors to the form
pub async fn index() -> Redirect {
    Redirect::to("/images/")
}

/// GET /images - Render the upload form
pub async fn show_form(State(state): State<AppState>) -> Response {
    let page = ImagesPage {
        bucket: state.config.storage.bucket.clone(),
        queue_mode: matches!(state.config.mode, TransferMode::Queue { .. }),
    };
    render_page(StatusCode::OK, &page)
}

/// POST /images - Run the submitted URL through the pipeline
///
/// Redirects (303) to the confirmation page on success. Any error is
/// rendered as the error page by `Error::into_response`.
pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<ImageForm>,
) -> Result<Redirect> {
    let outcome = state.service.submit(&form.image_url).await?;
    Ok(Redirect::to(&outcome.redirect_target()))
}

/// GET /uploaded_image - Confirmation for a direct upload
pub async fn uploaded_image(Query(query): Query<UploadedQuery>) -> Response {
    let show_preview = is_http_url(&query.destination);
    let page = UploadedPage {
        name: query.name,
        source: query.source,
        destination: query.destination,
        show_preview,
    };
    render_page(StatusCode::OK, &page)
}

/// GET /request_received - Confirmation for a queued upload
pub async fn request_received(Query(query): Query<ReceivedQuery>) -> Response {
    let destination = if query.dest_base_url.is_empty() || query.dest_img_name.is_empty() {
        String::new()
    } else {
        join_key(&query.dest_base_url, &query.dest_img_name)
    };

    let page = ReceivedPage {
        name: query.name,
        source: query.source,
        destination,
    };
    render_page(StatusCode::OK, &page)
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
