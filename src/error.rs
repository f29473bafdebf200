use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failures raised by the admin API client itself.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The requested resource does not exist (HTTP 404).
    #[error("Resource not found: {path}")]
    NotFound { path: String },

    /// The access token lacks permission for the resource (HTTP 403).
    #[error("Access forbidden: {path}")]
    Forbidden { path: String },

    #[error("Unexpected response (HTTP {status}) from {path}: {body}")]
    UnexpectedStatus {
        status: StatusCode,
        path: String,
        body: String,
    },

    /// The body could not be decoded or lacks the expected shape.
    #[error("Malformed response from {path}: {reason}")]
    Malformed { path: String, reason: String },

    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Errors surfaced by entity operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The admin API answered with an `errors` payload.
    #[error("{message}: {errors}")]
    RemoteOperation { message: String, errors: Value },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl Error {
    pub fn remote_operation(message: impl Into<String>, errors: Value) -> Self {
        Error::RemoteOperation {
            message: message.into(),
            errors,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Remote(RemoteError::NotFound { .. }))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
