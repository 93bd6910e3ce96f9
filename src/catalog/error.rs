//! Failure taxonomy for calls against the external game catalog.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`CatalogError`] failures.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Classified failure of a catalog call. Only transient kinds are retried.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The attempt did not complete within the configured budget.
    #[error("catalog request `{path}` timed out after {after:?}")]
    Timeout { path: String, after: Duration },
    /// The catalog refused the request (4xx). Never retried.
    #[error("catalog rejected `{path}` with status {status}")]
    ClientRejected { path: String, status: StatusCode },
    /// The catalog failed on its side (5xx).
    #[error("catalog unavailable for `{path}` (status {status})")]
    ServerUnavailable { path: String, status: StatusCode },
    /// Connection refused, reset, DNS failure and other network trouble.
    #[error("failed to reach catalog for `{path}`")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The response body could not be decoded. Never retried.
    #[error("malformed catalog response for `{path}`")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build catalog client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
}

impl CatalogError {
    /// Classify a non-success HTTP status.
    pub fn from_status(path: &str, status: StatusCode) -> Self {
        if status.is_server_error() {
            CatalogError::ServerUnavailable {
                path: path.to_owned(),
                status,
            }
        } else {
            CatalogError::ClientRejected {
                path: path.to_owned(),
                status,
            }
        }
    }

    /// Classify a failure raised while sending the request or reading the body.
    pub fn from_transport(path: &str, source: reqwest::Error, budget: Duration) -> Self {
        if source.is_timeout() {
            CatalogError::Timeout {
                path: path.to_owned(),
                after: budget,
            }
        } else {
            CatalogError::Transport {
                path: path.to_owned(),
                source,
            }
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CatalogError::Timeout { .. }
                | CatalogError::ServerUnavailable { .. }
                | CatalogError::Transport { .. }
        )
    }

    /// The catalog reported that the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::ClientRejected { status, .. } if *status == StatusCode::NOT_FOUND
        )
    }
}
