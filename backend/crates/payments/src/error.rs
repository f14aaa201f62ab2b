//! Payment Error Types
//!
//! Payment-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Payment-specific result type alias
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Payment-specific error variants
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Checkout requested with no items
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart item price could not be parsed
    #[error("Unparseable price: {0}")]
    InvalidPrice(String),

    /// Callback without the correlation key
    #[error("external_reference is required")]
    MissingReference,

    /// No order matches the external reference
    #[error("Order not found")]
    OrderNotFound,

    /// The payment provider could not produce a checkout link
    #[error("Payment provider error: {0}")]
    Provider(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::EmptyCart
            | PaymentError::InvalidPrice(_)
            | PaymentError::MissingReference => ErrorKind::BadRequest,
            PaymentError::OrderNotFound => ErrorKind::NotFound,
            // Upstream failures surface as 500 and are never auto-retried
            PaymentError::Provider(_)
            | PaymentError::Database(_)
            | PaymentError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            PaymentError::Provider(msg) => {
                tracing::error!(message = %msg, "Payment provider failure");
            }
            PaymentError::Database(e) => {
                tracing::error!(error = %e, "Payment database error");
            }
            PaymentError::Internal(msg) => {
                tracing::error!(message = %msg, "Payment internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Payment error");
            }
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for PaymentError {
    fn from(err: AppError) -> Self {
        PaymentError::Internal(err.to_string())
    }
}
