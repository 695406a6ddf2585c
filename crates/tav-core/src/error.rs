//! Error taxonomy for the feedback API.

use thiserror::Error;

/// Failure modes of a feedback request.
///
/// Transport and decode failures carry the underlying message as a string so
/// that every variant stays constructible in reducer tests (a
/// `reqwest::Error` cannot be built by hand).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// HTTP 404 - the backend has nothing for this key.
    #[error("not found")]
    NotFound,

    /// Any other non-2xx response.
    #[error("server returned status {0}")]
    Status(u16),

    /// A 2xx response whose body was not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// No HTTP response at all (connection refused, DNS, timeout, ...).
    #[error("network error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
