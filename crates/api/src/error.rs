//! Unified error handling with Sentry integration.
//!
//! Provides the `ApiError` type returned by every handler. Each variant maps
//! to one HTTP status, and every error renders as
//! `{"message": "...", "error": "..."}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::PrettyJson;

/// Application-level error type for the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed path identifier or request body.
    #[error("{message} ({detail})")]
    BadRequest { message: String, detail: String },

    /// No entity matches the given identifier.
    #[error("{message} ({detail})")]
    NotFound { message: String, detail: String },

    /// Any other store failure.
    #[error("{message}: {source}")]
    Internal {
        message: String,
        #[source]
        source: RepositoryError,
    },
}

/// Error body sent to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
}

impl ApiError {
    /// A path ID that does not parse as a UUID.
    #[must_use]
    pub fn invalid_id(raw: &str, detail: impl std::fmt::Display) -> Self {
        Self::BadRequest {
            message: format!("Id [{raw}] is not a valid UUID"),
            detail: detail.to_string(),
        }
    }

    /// A request body that could not be decoded.
    #[must_use]
    pub fn invalid_body(rejection: &JsonRejection) -> Self {
        Self::BadRequest {
            message: "Invalid request body.".to_string(),
            detail: rejection.body_text(),
        }
    }

    /// Translate a repository error.
    ///
    /// `NotFound` names the missing entity and ID; anything else becomes an
    /// internal error carrying `context` as its client-facing message.
    #[must_use]
    pub fn from_repository(err: RepositoryError, context: impl Into<String>) -> Self {
        match err {
            RepositoryError::NotFound(entity, id) => Self::NotFound {
                message: format!("No {} exists with Id [{id}]", entity.as_str()),
                detail: err.to_string(),
            },
            RepositoryError::UnexpectedRowCount(_) | RepositoryError::Database(_) => {
                Self::Internal {
                    message: context.into(),
                    source: err,
                }
            }
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            Self::BadRequest { message, detail } | Self::NotFound { message, detail } => {
                tracing::debug!(%status, %message, %detail, "Request rejected");
                ErrorBody {
                    message,
                    error: detail,
                }
            }
            Self::Internal { message, source } => {
                let event_id = sentry::capture_error(&source);
                tracing::error!(
                    error = %source,
                    sentry_event_id = %event_id,
                    "{message}"
                );

                // Don't expose driver messages to clients
                let error = match source {
                    RepositoryError::UnexpectedRowCount(_) => source.to_string(),
                    RepositoryError::Database(_) | RepositoryError::NotFound(..) => {
                        "database error".to_string()
                    }
                };
                ErrorBody { message, error }
            }
        };

        (status, PrettyJson(body)).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use addressbook_core::UserId;
    use serde_json::Value;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_id_is_bad_request() {
        let parse_err = uuid::Uuid::parse_str("bob").unwrap_err();
        let (status, body) = render(ApiError::invalid_id("bob", &parse_err)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Id [bob] is not a valid UUID");
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_names_entity_and_id() {
        let id = UserId::parse_str("ddcfdd51-9715-4d4d-bea3-317cccea16ea").unwrap();
        let err = ApiError::from_repository(RepositoryError::user_not_found(id), "unused");
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["message"],
            "No user exists with Id [ddcfdd51-9715-4d4d-bea3-317cccea16ea]"
        );
        assert_eq!(
            body["error"],
            "User with Id [ddcfdd51-9715-4d4d-bea3-317cccea16ea] does not exist"
        );
    }

    #[tokio::test]
    async fn test_database_error_is_opaque() {
        let err = ApiError::from_repository(
            RepositoryError::Database(sqlx::Error::PoolTimedOut),
            "Error fetching user records",
        );
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error fetching user records");
        assert_eq!(body["error"], "database error");
    }

    #[tokio::test]
    async fn test_row_count_error_reports_count() {
        let err = ApiError::from_repository(
            RepositoryError::UnexpectedRowCount(0),
            "Error creating new user",
        );
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "invalid number of rows written: 0");
    }

    #[test]
    fn test_app_error_status_codes() {
        let bad = ApiError::BadRequest {
            message: "m".to_string(),
            detail: "d".to_string(),
        };
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(bad.to_string(), "m (d)");

        let internal = ApiError::from_repository(RepositoryError::Database(sqlx::Error::PoolClosed), "x");
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
