//! API error type and its HTTP rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sendwire_core::DispatchError;
use serde_json::json;
use thiserror::Error;

/// Everything `POST /send-email` can answer with besides success.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body is not a send request.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The email was not sent; carries the send error.
    #[error("{0}")]
    NotSent(String),

    /// The workflow itself broke.
    #[error(transparent)]
    Internal(#[from] DispatchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidBody(_) | Self::NotSent(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "success": false, "message": message });
        (status, Json(body)).into_response()
    }
}
