// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::session::SessionError;
use crate::validation::ValidationError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("An account with this email address already exists")]
    DuplicateEmail,

    #[error("This username is already taken")]
    DuplicateUsername,

    #[error("Genre already exists: {0}")]
    DuplicateGenre(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail | AppError::DuplicateUsername | AppError::DuplicateGenre(_) => {
                StatusCode::CONFLICT
            },
            AppError::InvalidCredentials | AppError::InvalidToken(_) | AppError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::DuplicateEmail => "USER_001",
            AppError::DuplicateUsername => "USER_002",
            AppError::DuplicateGenre(_) => "GENRE_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::InvalidToken(_) => "AUTH_002",
            AppError::Unauthenticated => "AUTH_003",
            AppError::NotFound(_) => "NF_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::DuplicateEmail | AppError::DuplicateUsername => self.to_string(),
            AppError::DuplicateGenre(_) => "This genre already exists".to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::InvalidToken(_) | AppError::Unauthenticated => {
                "Authentication required".to_string()
            },
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                "Internal server error".to_string()
            },
        }
    }

    /// True for failures the client did not cause
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = %self, code = self.error_code(), "internal error");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "client error");
        }

        let status = self.status_code();
        let error_code = self.error_code();

        // Internal details never leave the process in release builds
        let message = if cfg!(debug_assertions) && !self.is_internal() {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Malformed
            | SessionError::Tampered
            | SessionError::Expired
            | SessionError::Revoked => AppError::InvalidToken(err.to_string()),
            SessionError::MissingSecret | SessionError::WeakSecret(_) | SessionError::Seal(_) => {
                AppError::Internal(err.to_string())
            },
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {err}"))
    }
}
