//! Risk Error Types
//!
//! This module provides risk-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Risk-specific result type alias
pub type RiskResult<T> = Result<T, RiskError>;

/// Risk-specific error variants
///
/// Policy denials are NOT errors: the gatekeeper returns a typed
/// [`crate::domain::value_objects::AdmissionDecision`] for those. These
/// variants cover genuine faults and malformed admin input.
#[derive(Debug, Error)]
pub enum RiskError {
    /// User has no account record
    #[error("User not found")]
    UserNotFound,

    /// Malformed blacklist subject (unknown type or bad value)
    #[error("Invalid blacklist subject: {0}")]
    InvalidSubject(String),

    /// Missing required header (e.g., X-User-Id)
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RiskError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RiskError::UserNotFound => StatusCode::NOT_FOUND,
            RiskError::InvalidSubject(_) | RiskError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            RiskError::Database(_) | RiskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RiskError::UserNotFound => ErrorKind::NotFound,
            RiskError::InvalidSubject(_) | RiskError::MissingHeader(_) => ErrorKind::BadRequest,
            RiskError::Database(_) | RiskError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            RiskError::Database(e) => {
                tracing::error!(error = %e, "Risk database error");
            }
            RiskError::Internal(msg) => {
                tracing::error!(message = %msg, "Risk internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Risk error");
            }
        }
    }
}

impl From<RiskError> for AppError {
    fn from(err: RiskError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        AppError::new(kind, message)
    }
}

impl IntoResponse for RiskError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        // Return empty body for security (don't leak details)
        (status, ()).into_response()
    }
}
