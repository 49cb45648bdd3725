use aviary_core::{AttachmentError, StorageError};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors surfaced by request handlers.
///
/// Not-found, bad-request and form errors carry a message shown to the
/// client. Every upstream failure is logged and answered with a bare 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("malformed form: {}", .0.body_text())]
    Form(#[from] MultipartError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("attachment error: {0}")]
    Attachment(#[from] AttachmentError),
    #[error("render error: {0}")]
    Render(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            // Oversized bodies are 413, anything else the parser rejects is 400.
            AppError::Form(err) => {
                let message = format!("malformed form: {}", err.body_text());
                (err.status(), message).into_response()
            }
            other => {
                error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_message_status() {
        let response = AppError::NotFound("Bird not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_failures_are_internal_errors() {
        let storage = AppError::from(StorageError::Unavailable("down".into())).into_response();
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let attachment = AppError::from(AttachmentError::Io("disk full".into())).into_response();
        assert_eq!(attachment.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_status() {
        let response = AppError::BadRequest("weight: not a number".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
