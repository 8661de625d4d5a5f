use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;

/// Errors returned by handlers and extractors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request payload rejected by a rule the validator cannot express
    #[error("{0}")]
    BadRequest(String),

    /// No signed-in user
    #[error("Login required")]
    Unauthenticated,

    /// Signed in, but not staff
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Password hashing failed")]
    PasswordHash,

    #[error("Session error: {0}")]
    Session(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Session(err.to_string())
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, String) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR".to_string()),
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "LOGIN_REQUIRED".to_string()),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED".to_string()),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS".to_string()),
            Self::NotFound(entity) => (StatusCode::NOT_FOUND, not_found_code(entity)),
            Self::PasswordHash => (StatusCode::INTERNAL_SERVER_ERROR, "PASSWORD_HASH_ERROR".to_string()),
            Self::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR".to_string()),
            Self::Storage(err) => match err {
                StorageError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR".to_string())
                }
                StorageError::NotFound { entity, .. } => (StatusCode::NOT_FOUND, not_found_code(entity)),
                StorageError::BookNotFound(_) => (StatusCode::BAD_REQUEST, "BOOK_NOT_FOUND".to_string()),
                StorageError::EmailTaken(_) => {
                    (StatusCode::BAD_REQUEST, "EMAIL_ALREADY_REGISTERED".to_string())
                }
                StorageError::SlugTaken(_) => (StatusCode::CONFLICT, "SLUG_ALREADY_EXISTS".to_string()),
                StorageError::InsufficientPoints { .. } => {
                    (StatusCode::BAD_REQUEST, "INSUFFICIENT_POINTS".to_string())
                }
                StorageError::AdminUndeletable => {
                    (StatusCode::BAD_REQUEST, "CANNOT_DELETE_ADMIN".to_string())
                }
                StorageError::Invalid(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST".to_string()),
            },
        }
    }
}

fn not_found_code(entity: &str) -> String {
    format!("{}_NOT_FOUND", entity.to_uppercase())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected with {}: {}", code, self);
        }

        // Database details stay in the log.
        let message = match &self {
            Self::Storage(StorageError::Database(_)) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code,
            success: false,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
