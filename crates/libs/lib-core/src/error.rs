//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used consistently
//! across the store, the chat core and the HTTP handlers.
//!
//! ## Error Categories
//!
//! 1. **Client Errors** (4xx)
//!    - [`InvalidInput`](AppError::InvalidInput) → 400 Bad Request
//!    - [`Unauthorized`](AppError::Unauthorized) → 401 Unauthorized
//!    - [`Forbidden`](AppError::Forbidden) → 403 Forbidden
//!    - [`NotFound`](AppError::NotFound) → 404 Not Found
//!    - [`SessionClosed`](AppError::SessionClosed) → 409 Conflict
//!
//! 2. **Server Errors** (5xx)
//!    - [`Config`](AppError::Config), [`Database`](AppError::Database),
//!      [`Decoding`](AppError::Decoding), [`Internal`](AppError::Internal) → 500
//!
//! Chat sockets never render these; endpoints log them and follow the
//! per-event policy instead.

use thiserror::Error;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input validation error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role lacks the privilege.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The chat session is closed and accepts no further changes.
    #[error("Session closed: {0}")]
    SessionClosed(String),

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Data decoding error (JSON, stored enum values).
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Internal server error (unexpected failures).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SessionClosed(_) => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::Database(_) | AppError::Decoding(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For internal errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::SessionClosed(_) => "Chat session is closed".to_string(),
            AppError::Config(_) | AppError::Database(_) | AppError::Decoding(_) | AppError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Config",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::SessionClosed(_) => "SessionClosed",
            AppError::Database(_) => "Database",
            AppError::Decoding(_) => "Decoding",
            AppError::Internal(_) => "Internal",
        }
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Server error: {}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        let body = Json(json!({
            "error": self.user_message(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert `sqlx::Error` to `AppError`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            sqlx::Error::Database(db_err) => AppError::Database(db_err.message().to_string()),
            sqlx::Error::ColumnDecode { index, source } => {
                AppError::Decoding(format!("column {}: {}", index, source))
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decoding(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::SessionClosed("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Database("disk I/O".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Database("no such table: chat_sessions".into());
        assert_eq!(err.user_message(), "An internal error occurred");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
