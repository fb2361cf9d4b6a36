//! Error types for the proxy API
//!
//! Provides unified error handling using thiserror. The cache and session
//! core never raise these; they surface only from route handlers and the
//! upstream client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == API Error Enum ==
/// Errors a route handler can answer with.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required query parameter was absent or empty
    #[error("Missing query: {0}")]
    MissingQuery(String),

    /// A query parameter held a value the route does not accept
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Upstream answered but had nothing for the request
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream fetch failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// No valid session on the request
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Upstream Error Enum ==
/// Failures of the outbound fetch collaborator.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected response from {url}: {reason}")]
    Shape { url: String, reason: String },
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { url, status: 404 } => ApiError::NotFound(url),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

// == Decode Error Enum ==
/// Reasons a session token failed to decode. Never shown to clients.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("no session secret configured")]
    MissingSecret,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for DecodeError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => DecodeError::Expired,
            _ => DecodeError::Invalid(err.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingQuery(_) | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for route handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
