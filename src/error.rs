//! Error types for the relay
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Relay Error Enum ==
/// Unified error type for the request path.
///
/// Startup-time failures (bad upstream URL, unreadable certificate material)
/// are not represented here; those abort the process before serving begins.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The upstream could not be reached or the exchange failed mid-flight
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Client exceeded its request quota for the current window
    #[error("rate limit exceeded")]
    RateLimited(String),

    /// Failure inside the relay itself (e.g. reading the inbound body)
    #[error("internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::Upstream(err) => {
                // Log the transport detail, never expose it to the client
                tracing::error!(error = %err, "upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "bad gateway" })),
                )
                    .into_response()
            }
            // Fixed plain-text body, mirroring the configured throttling message
            RelayError::RateLimited(message) => {
                (StatusCode::TOO_MANY_REQUESTS, message).into_response()
            }
            RelayError::Internal(msg) => {
                tracing::error!(error = %msg, "internal relay error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal error" })),
                )
                    .into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the relay.
pub type Result<T> = std::result::Result<T, RelayError>;
