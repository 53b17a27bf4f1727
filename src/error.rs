//! Error types
//!
//! Every failure a tracker operation can surface. All of them are reported
//! to the caller as inline messages; none is fatal to the server.

use thiserror::Error;

use crate::db::DbError;

#[derive(Debug, Error)]
pub enum FitzyError {
    /// No session, or the upstream rejected the credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Missing or unusable input (empty query, missing credentials, no profile)
    #[error("{0}")]
    Validation(String),

    /// The upstream rejected the request as malformed
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The upstream answered with a non-success status
    #[error("Upstream request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Transport failure before a response was received
    #[error("Network error: {0}")]
    Network(String),

    /// A success response whose body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

pub type FitzyResult<T> = Result<T, FitzyError>;

impl FitzyError {
    pub fn validation(message: impl Into<String>) -> Self {
        FitzyError::Validation(message.into())
    }

    /// Map a non-success HTTP status and its body to the matching variant
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => FitzyError::Unauthorized,
            400 => FitzyError::BadRequest(body),
            _ => FitzyError::Upstream { status, body },
        }
    }
}

impl From<reqwest::Error> for FitzyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FitzyError::MalformedPayload(e.to_string())
        } else {
            FitzyError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FitzyError {
    fn from(e: serde_json::Error) -> Self {
        FitzyError::MalformedPayload(e.to_string())
    }
}
