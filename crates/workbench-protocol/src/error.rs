//! Host error taxonomy and the HTTP status each kind maps to.

use std::path::PathBuf;

/// Result alias used by request handling.
pub type HostResult<T> = Result<T, HostError>;

/// Errors surfaced by request handling.
///
/// `NotFound` is deliberately reported with the same status as `BadRequest`
/// so callers cannot probe which callback ids exist.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Malformed or missing caller input. Raised before any state mutation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Callback id unknown or already consumed.
    #[error("not found")]
    NotFound,

    /// A required upstream (the development companion) is unreachable.
    #[error("{0}")]
    BadGateway(String),

    /// Extension scan of a configured folder failed.
    #[error("failed to scan extensions in {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Anything else that prevents the page from being assembled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HostError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::BadGateway(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::NotFound => 400,
            Self::BadGateway(_) => 502,
            Self::Scan { .. } | Self::Internal(_) => 500,
        }
    }

    /// Body text shown to the caller. Hides whether a callback id existed.
    pub fn public_message(&self) -> String {
        match self {
            Self::BadRequest(_) | Self::NotFound => "Bad Request".to_string(),
            other => other.to_string(),
        }
    }
}
