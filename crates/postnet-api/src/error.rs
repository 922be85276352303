//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API errors. Every variant maps to a 400: byzantine input is the caller's
/// problem, never this node's.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A wire field could not be decoded.
    #[error(transparent)]
    Malformed(#[from] postnet_consensus::ConsensusError),

    /// A post's signature does not verify.
    #[error("invalid post")]
    InvalidPost,

    /// A batch contained a post whose signature does not verify.
    #[error("posts are invalid")]
    InvalidBatch,

    /// The post is already known.
    #[error(transparent)]
    Duplicate(#[from] postnet_state::StateError),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
