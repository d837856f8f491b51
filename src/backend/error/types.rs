/**
 * Backend Error Types
 *
 * This module defines the error type returned by HTTP handlers. Errors from
 * the shared types, the catalog store and the realtime layer convert into it
 * with `?`, and each variant maps to an HTTP status code.
 *
 * # Status Mapping
 *
 * - Validation failures - 400 Bad Request
 * - Missing rows, unknown channels - 404 Not Found
 * - Dangling references (order for a missing product) - 422 Unprocessable Entity
 * - Database and serialization failures - 500 Internal Server Error
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::catalog::StoreError;
use crate::backend::realtime::RealtimeError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// ```rust
/// use axum::http::StatusCode;
/// use storefront::backend::error::BackendError;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        status: StatusCode,
        message: String,
    },

    /// Shared error (validation, serialization of shared types)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Catalog store error
    #[error(transparent)]
    StoreError(#[from] StoreError),

    /// Realtime layer error
    #[error(transparent)]
    RealtimeError(#[from] RealtimeError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::StoreError(err) => match err {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::InvalidReference { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::RealtimeError(err) => match err {
                RealtimeError::UnknownChannel(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error message
    ///
    /// Database details stay in the log; clients get a generic message.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::StoreError(StoreError::Database(_)) => "Database error".to_string(),
            other => other.to_string(),
        }
    }
}
