//! HTTP error responses for the journal server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::Error;

/// Body returned for every 500 response. Storage details stay in the logs.
pub(super) const INTERNAL_ERROR_BODY: &str = "internal server error";

/// Error response wrapper for converting journal errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request named no scope.
    MissingScope,
    /// The request was malformed.
    BadRequest(String),
    /// Anything else. The cause has already been logged.
    Internal,
}

impl ApiError {
    /// Logs `context` and returns an opaque internal error.
    pub(super) fn internal(context: &str, error: impl std::fmt::Display) -> Self {
        tracing::error!(error = %error, "{}", context);
        ApiError::Internal
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidScope(msg) => ApiError::BadRequest(format!("invalid scope: {}", msg)),
            other => ApiError::internal("journal request failed", other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingScope => {
                (StatusCode::BAD_REQUEST, "missing scope parameter").into_response()
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
            }
        }
    }
}
