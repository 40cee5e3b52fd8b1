//! Error types for repository operations
//!
//! Transport failures, bad status codes and unreadable payloads all make the
//! search aggregator fall back to the direct path, so the enum carries enough
//! detail for logs while [`ErrorKind`] gives the coarse classification the
//! presentation layer sees.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Error types for repository operations
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// Transport-level failure reaching the backend
    #[error("Network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// Backend answered with a non-success HTTP status
    #[error("{endpoint} responded with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// Backend answered but the payload could not be interpreted
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    /// A user-facing region value has no internal key
    #[error("Region not found: {0}")]
    RegionNotFound(String),

    /// The operation is not offered for this entity type
    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

impl RepositoryError {
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        RepositoryError::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn malformed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        RepositoryError::MalformedResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Classify a `reqwest` failure for the given endpoint
    #[must_use]
    pub fn from_reqwest(endpoint: &str, error: &reqwest::Error) -> Self {
        if error.is_decode() {
            RepositoryError::malformed(endpoint, error.to_string())
        } else if let Some(status) = error.status() {
            RepositoryError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }
        } else {
            RepositoryError::network(endpoint, error.to_string())
        }
    }

    /// Whether this failure should send a search down the fallback path
    #[must_use]
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            RepositoryError::Network { .. }
                | RepositoryError::Status { .. }
                | RepositoryError::MalformedResponse { .. }
        )
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Network { .. } | RepositoryError::Status { .. } => ErrorKind::Network,
            RepositoryError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            RepositoryError::RegionNotFound(_) => ErrorKind::RegionNotFound,
            RepositoryError::Unsupported(_) => ErrorKind::Unsupported,
        }
    }
}

/// Coarse error classification reported through `onError(kind, message)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    MalformedResponse,
    RegionNotFound,
    PartialCollectionFailure,
    Unsupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::RegionNotFound => "region_not_found",
            ErrorKind::PartialCollectionFailure => "partial_collection_failure",
            ErrorKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}
