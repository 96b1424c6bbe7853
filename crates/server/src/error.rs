//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<Response, AppError>`; every response body uses the
//! `{message, status, body}` envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::db::StoreError;
use crate::search::SearchError;

/// Application-level error type for the marketplace service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range input field.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing, invalid, or expired credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Role not permitted, or caller does not own the target resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation detected by a pre-check.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence-layer fault. The transaction was rolled back; detail is
    /// logged, never returned to the caller.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Search backend failed on a read path. (Write-path index failures are
    /// swallowed by the propagation wrapper and never become this.)
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Search(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-error detail stays in the logs.
    fn message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Store(StoreError::Conflict(_)) => "Conflict with existing record".to_owned(),
            Self::Search(_) => "Search service error".to_owned(),
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Store(StoreError::Database(_)) | Self::Search(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        json_response(self.message(), status, Value::Object(serde_json::Map::new()))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// The response envelope every endpoint uses.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope {
    pub message: String,
    pub status: u16,
    pub body: Value,
}

/// Build a `{message, status, body}` JSON response.
pub fn json_response(message: impl Into<String>, status: StatusCode, body: Value) -> Response {
    let envelope = ApiEnvelope {
        message: message.into(),
        status: status.as_u16(),
        body,
    };
    (status, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("bad".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("no token".to_owned()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("not yours".to_owned()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("shop".to_owned()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("duplicate".to_owned()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Internal("boom".to_owned()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err = AppError::Store(StoreError::Conflict("unique".to_owned()));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_server_error_detail_not_exposed() {
        let err = AppError::Internal("connection pool exhausted at 10.0.0.3".to_owned());
        assert_eq!(err.message(), "Internal server error");

        let err = AppError::Store(StoreError::Database(sqlx::Error::PoolClosed));
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_client_error_messages_pass_through() {
        let err = AppError::Validation("Price must be greater than 0".to_owned());
        assert_eq!(err.message(), "Price must be greater than 0");
    }
}
