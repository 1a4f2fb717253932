use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::registry::ResolutionError;
use crate::storage::StorageError;
use crate::validator::ValidationError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// Failures as clients see them: every rejected input collapses into
/// "invalid url", every backend failure into "server error".
#[derive(Debug)]
pub enum ApiError {
    InvalidUrl,
    Server,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidUrl => (
                StatusCode::OK,
                Json(ErrorResponse {
                    error: "invalid url",
                }),
            )
                .into_response(),
            ApiError::Server => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "server error",
                }),
            )
                .into_response(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        tracing::debug!(error = %err, "rejected url");
        ApiError::InvalidUrl
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "storage failure");
        ApiError::Server
    }
}

impl From<ResolutionError> for ApiError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::InvalidIdentifier | ResolutionError::NotFound => {
                tracing::debug!(error = %err, "unresolvable identifier");
                ApiError::InvalidUrl
            }
            ResolutionError::Storage(err) => err.into(),
        }
    }
}
