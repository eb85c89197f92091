//! Quest Error Types
//!
//! This module provides quest-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Policy denials (gatekeeper, daily cap) are NOT errors; the claim use
//! case returns a typed outcome for those. These variants cover invalid
//! transitions, malformed proofs, and genuine faults.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Quest-specific result type alias
pub type QuestResult<T> = Result<T, QuestError>;

/// Quest-specific error variants
#[derive(Debug, Error)]
pub enum QuestError {
    /// Quest does not exist
    #[error("Quest not found")]
    QuestNotFound,

    /// Action does not exist for this (user, quest)
    #[error("Action not found")]
    ActionNotFound,

    /// User has no account record
    #[error("User not found")]
    UserNotFound,

    /// Quest exists but is not claimable (draft, paused, archived)
    #[error("Quest is not active")]
    QuestNotActive,

    /// The action is in a state that does not permit this operation
    #[error("Invalid transition from {0}")]
    InvalidTransition(&'static str),

    /// Proof payload does not match the quest type
    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    /// Quest type requires a bound social identity and the user has none
    #[error("No social identity bound to this account")]
    IdentityNotBound,

    /// Another rewarded action already used this external identity
    #[error("Identity already rewarded for this quest")]
    IdentityAlreadyRewarded,

    /// Binding verification code missing or expired
    #[error("Verification code missing or expired")]
    BindingCodeInvalid,

    /// Binding code not found on the external account
    #[error("Verification code not found on the external profile")]
    BindingCodeMismatch,

    /// Verification provider is temporarily unavailable; retryable
    #[error("Verification unavailable: {0}")]
    VerificationUnavailable(String),

    /// Missing required header (e.g., X-User-Id)
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Risk engine fault surfaced during admission
    #[error("Risk engine error: {0}")]
    Risk(#[from] risk::RiskError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuestError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            QuestError::QuestNotFound | QuestError::ActionNotFound | QuestError::UserNotFound => {
                StatusCode::NOT_FOUND
            }
            QuestError::QuestNotActive
            | QuestError::IdentityNotBound
            | QuestError::BindingCodeInvalid
            | QuestError::BindingCodeMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            QuestError::InvalidTransition(_) | QuestError::IdentityAlreadyRewarded => {
                StatusCode::CONFLICT
            }
            QuestError::InvalidProof(_) | QuestError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            QuestError::VerificationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            QuestError::Risk(inner) => inner.status_code(),
            QuestError::Database(_) | QuestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuestError::QuestNotFound | QuestError::ActionNotFound | QuestError::UserNotFound => {
                ErrorKind::NotFound
            }
            QuestError::QuestNotActive
            | QuestError::IdentityNotBound
            | QuestError::BindingCodeInvalid
            | QuestError::BindingCodeMismatch => ErrorKind::UnprocessableEntity,
            QuestError::InvalidTransition(_) | QuestError::IdentityAlreadyRewarded => {
                ErrorKind::Conflict
            }
            QuestError::InvalidProof(_) | QuestError::MissingHeader(_) => ErrorKind::BadRequest,
            QuestError::VerificationUnavailable(_) => ErrorKind::ServiceUnavailable,
            QuestError::Risk(inner) => inner.kind(),
            QuestError::Database(_) | QuestError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            QuestError::Database(e) => {
                tracing::error!(error = %e, "Quest database error");
            }
            QuestError::Internal(msg) => {
                tracing::error!(message = %msg, "Quest internal error");
            }
            QuestError::VerificationUnavailable(msg) => {
                tracing::warn!(message = %msg, "Verification provider unavailable");
            }
            QuestError::IdentityAlreadyRewarded => {
                tracing::warn!("Duplicate identity reward attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Quest error");
            }
        }
    }
}

impl From<QuestError> for AppError {
    fn from(err: QuestError) -> Self {
        let kind = err.kind();
        match &err {
            // Never leak storage internals; the client just retries
            QuestError::Database(_) | QuestError::Internal(_) => {
                AppError::new(kind, "Something went wrong").with_action("Please try again")
            }
            QuestError::VerificationUnavailable(_) => {
                AppError::new(kind, "Verification is temporarily unavailable")
                    .with_action("Please try again")
            }
            _ => AppError::new(kind, err.to_string()),
        }
    }
}

impl IntoResponse for QuestError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
