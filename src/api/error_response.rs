//! HTTP error response handling
//!
//! Every pipeline error ends up here: it is logged once and rendered as the
//! error page with a status code chosen by [`ToHttpStatus`].

use crate::api::views::{ErrorPage, render_page};
use crate::error::{Error, ToHttpStatus};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        } else {
            tracing::warn!(code = self.error_code(), error = %self, "Request rejected");
        }

        let page = ErrorPage {
            code: self.error_code().to_string(),
            message: self.to_string(),
        };
        render_page(status_code, &page)
    }
}
