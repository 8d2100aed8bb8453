//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use common::error::StoreError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed input: bad identifier format, bad collection name,
    /// non-object payload, missing credential fields
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Credential verification failed
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account exists but login is disabled
    #[error("Account is disabled")]
    AccountDisabled,

    /// Token failed signature or structural validation
    #[error("Invalid token")]
    InvalidToken,

    /// Token expiry instant is in the past
    #[error("Token expired")]
    TokenExpired,

    /// No document with the given identifier
    #[error("{0}")]
    NotFound(String),

    /// Login attempts exceeded the throttle window
    #[error("Too many login attempts")]
    TooManyAttempts,

    /// Unexpected failure reaching the document store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable code carried in every error body
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "MALFORMED_INPUT",
            // A disabled account renders exactly like bad credentials so
            // callers cannot probe which case occurred.
            ApiError::InvalidCredentials | ApiError::AccountDisabled => "INVALID_CREDENTIALS",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            ApiError::Store(_) => "STORE_FAILURE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::AccountDisabled => {
                warn!("Login denied for disabled account");
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            ApiError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::TooManyAttempts => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many login attempts".to_string(),
            ),
            ApiError::Store(e) => {
                error!("Store failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
