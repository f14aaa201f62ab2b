//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Username already exists
    #[error("Username already exists")]
    UsernameTaken,

    /// Invalid credentials (unknown user or wrong password)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Account is disabled
    #[error("Account is disabled")]
    AccountDisabled,

    /// Session missing, expired, or superseded
    #[error("Not authenticated")]
    SessionInvalid,

    /// Valid session but not an administrator
    #[error("Administrator privilege required")]
    AdminRequired,

    /// Temporary login token missing or expired
    #[error("Temporary token invalid or expired")]
    TempTokenInvalid,

    /// Invalid 2FA code
    #[error("Invalid two-factor authentication code")]
    InvalidTwoFactorCode,

    /// 2FA not set up for this user
    #[error("Two-factor authentication not enabled")]
    TwoFactorNotSetup,

    /// Username validation error
    #[error("Invalid username: {0}")]
    InvalidUserName(String),

    /// Password policy violation
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Unparseable date filter
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::InvalidCredentials
            | AuthError::SessionInvalid
            | AuthError::TempTokenInvalid
            | AuthError::InvalidTwoFactorCode
            | AuthError::TwoFactorNotSetup => ErrorKind::Unauthorized,
            AuthError::AccountDisabled | AuthError::AdminRequired => ErrorKind::Forbidden,
            // Duplicate unique fields are client input errors here, not conflicts
            AuthError::UsernameTaken
            | AuthError::InvalidUserName(_)
            | AuthError::PasswordValidation(_)
            | AuthError::InvalidDate(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidTwoFactorCode => {
                tracing::warn!("Invalid 2FA code submitted");
            }
            AuthError::AdminRequired => {
                tracing::warn!("Non-admin session attempted an admin operation");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::PasswordValidation(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
