// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use parley_common::ApiResponse;
use thiserror::Error;

use crate::validation::FieldErrors;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Email or username already in use")]
    DuplicateUser,

    /// Identical for unknown-email and wrong-password so callers cannot
    /// probe which accounts exist.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No token provided")]
    TokenMissing,

    #[error("No refresh token provided")]
    RefreshTokenMissing,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Access token expired")]
    TokenExpired,

    #[error("Token payload is malformed")]
    TokenMalformed,

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient privileges")]
    Forbidden,

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::RefreshTokenMissing => StatusCode::BAD_REQUEST,
            AppError::DuplicateUser => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::TokenMissing
            | AppError::TokenInvalid
            | AppError::TokenExpired
            | AppError::TokenMalformed => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    ///
    /// `TokenExpired` carries its own code so clients can trigger their
    /// refresh flow instead of re-prompting for credentials.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::DuplicateUser => "USER_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::TokenMissing => "AUTH_002",
            AppError::TokenInvalid => "AUTH_003",
            AppError::TokenExpired => "AUTH_004",
            AppError::TokenMalformed => "AUTH_005",
            AppError::RefreshTokenMissing => "AUTH_006",
            AppError::UserNotFound => "USER_002",
            AppError::Forbidden => "PERM_001",
            AppError::RateLimitExceeded { .. } => "RATE_001",
            AppError::Store(_) => "STORE_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for clients
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Store(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
            AppError::RateLimitExceeded { .. } => {
                "Too many requests, please try again later".to_string()
            },
            other => other.to_string(),
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internals are logged server-side, never leaked to the client.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }

        let body = match &self {
            AppError::Validation(errors) => ApiResponse::<()>::fail_with_details(
                self.sanitized_message(),
                self.error_code(),
                errors.to_details(),
            ),
            _ => ApiResponse::<()>::fail(self.sanitized_message(), self.error_code()),
        };

        let mut response = (status, axum::Json(body)).into_response();
        if let AppError::RateLimitExceeded { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
