use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{catalog::error::CatalogError, dao::storage::StorageError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The store refused a write: an integrity violation nothing above it resolved.
    #[error("storage integrity error")]
    Storage(#[source] StorageError),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Explicit creation of something that already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("already following user {0}")]
    AlreadyFollowing(Uuid),
    #[error("not following user {0}")]
    NotFollowing(Uuid),
    #[error("users cannot follow themselves")]
    SelfFollow,
    /// Rating score outside `1..=5`.
    #[error("invalid score {0}: expected a value between 1 and 5")]
    InvalidScore(i32),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The acting user does not own the targeted resource.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The external catalog failed or refused the request.
    #[error("game catalog unavailable")]
    ExternalUnavailable(#[source] CatalogError),
    /// Operation exceeded its timeout limit.
    #[error("operation timed out")]
    Timeout(#[source] CatalogError),
    /// A registered user has no default list. Never expected.
    #[error("default list missing for user {0}")]
    DefaultListMissing(Uuid),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Timeout { .. } => ServiceError::Timeout(err),
            other => ServiceError::ExternalUnavailable(other),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The request does not identify its caller.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Caller is not allowed to act on the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A dependency is temporarily out of reach.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(source) => AppError::Internal(source.to_string()),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            err @ (ServiceError::AlreadyExists(_)
            | ServiceError::AlreadyFollowing(_)
            | ServiceError::NotFollowing(_)
            | ServiceError::InvalidState(_)) => AppError::Conflict(err.to_string()),
            err @ (ServiceError::SelfFollow | ServiceError::InvalidScore(_)) => {
                AppError::BadRequest(err.to_string())
            }
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::ExternalUnavailable(_) | ServiceError::Timeout(_) => {
                AppError::ServiceUnavailable("game catalog temporarily unavailable, try again".into())
            }
            err @ ServiceError::DefaultListMissing(_) => AppError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode as UpstreamStatus;

    use super::*;

    #[test]
    fn catalog_timeouts_keep_their_kind() {
        let err: ServiceError = CatalogError::Timeout {
            path: "games/1".into(),
            after: Duration::from_secs(10),
        }
        .into();
        assert!(matches!(err, ServiceError::Timeout(_)));

        let err: ServiceError =
            CatalogError::from_status("games/1", UpstreamStatus::BAD_GATEWAY).into();
        assert!(matches!(err, ServiceError::ExternalUnavailable(_)));
    }

    #[test]
    fn upstream_failures_read_as_temporary_not_missing() {
        let err: ServiceError =
            CatalogError::from_status("games/1", UpstreamStatus::SERVICE_UNAVAILABLE).into();
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn taxonomy_maps_to_http_statuses() {
        let cases = [
            (ServiceError::NotFound("game".into()), StatusCode::NOT_FOUND),
            (ServiceError::AlreadyFollowing(Uuid::nil()), StatusCode::CONFLICT),
            (ServiceError::NotFollowing(Uuid::nil()), StatusCode::CONFLICT),
            (ServiceError::SelfFollow, StatusCode::BAD_REQUEST),
            (ServiceError::InvalidScore(9), StatusCode::BAD_REQUEST),
            (ServiceError::Forbidden("rating".into()), StatusCode::FORBIDDEN),
            (
                ServiceError::Storage(StorageError::Conflict {
                    constraint: "ratings.user_id_game_id",
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::Storage(StorageError::MissingRow {
                    entity: "game",
                    id: "g1".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::DefaultListMissing(Uuid::nil()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
