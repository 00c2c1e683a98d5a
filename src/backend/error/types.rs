/**
 * Backend Error Types
 *
 * This module defines the error type returned by every service and handler
 * in the backend. Each variant maps to exactly one HTTP status code.
 *
 * # Error Categories
 *
 * ## Validation
 *
 * Missing or malformed fields, detected before any store access (400).
 *
 * ## Authorization
 *
 * - `Unauthorized` - wrong user, non-admin caller, bad token (401)
 * - `Forbidden` - wrong group password, non-member (403)
 * - `EditWindowExpired` - author edit attempted too late (403)
 *
 * ## Lookup
 *
 * - `NotFound` - missing group, message or user (404)
 * - `DuplicateName` - group name or account already taken (409)
 *
 * ## Internal
 *
 * Store, hashing and token failures (500). The underlying error is logged
 * server-side only; clients see a generic message.
 */

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Message returned to clients for any internal failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use surfchat::backend::error::BackendError;
///
/// let err = BackendError::unauthorized("Only the admin may delete messages");
/// assert_eq!(err.status_code().as_u16(), 401);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request could not be read (e.g., malformed JSON body or query)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Caller is not allowed to perform the action
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Caller is known but the request is refused
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// The author tried to edit after the edit window closed
    #[error("Edit window has expired")]
    EditWindowExpired,

    /// Group, message or user does not exist
    #[error("{what} not found")]
    NotFound { what: &'static str },

    /// Name collision on create or rename
    #[error("'{name}' is already taken")]
    DuplicateName { name: String },

    /// Store, hashing or token failure
    #[error("Internal error: {message}")]
    InternalError { message: String },

    /// Validation error from the shared module
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a new forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(what: &'static str) -> Self {
        Self::NotFound { what }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } | Self::EditWindowExpired => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateName { .. } => StatusCode::CONFLICT,
            Self::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the message safe to return to clients
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. }
            | Self::Unauthorized { message }
            | Self::Forbidden { message } => message.clone(),
            Self::InternalError { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether this error is a server-side failure
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(name) => Self::DuplicateName { name },
            StoreError::NotFound(what) => Self::NotFound { what },
            StoreError::Database(e) => Self::internal(format!("database: {}", e)),
        }
    }
}

impl From<bcrypt::BcryptError> for BackendError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::internal(format!("password hashing: {}", err))
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for BackendError {
    fn from(rejection: QueryRejection) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for BackendError {
    fn from(rejection: PathRejection) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<jsonwebtoken::errors::Error> for BackendError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::internal(format!("token: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            BackendError::unauthorized("no").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackendError::forbidden("wrong password").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(BackendError::EditWindowExpired.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            BackendError::not_found("group").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BackendError::DuplicateName { name: "general".into() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BackendError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_shared_error_is_bad_request() {
        let err: BackendError = SharedError::validation("name", "name is required").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("name is required"));
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = BackendError::internal("connection refused on 10.0.0.3:5432");
        assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);
        assert!(err.is_internal());
    }

    #[test]
    fn test_from_store_error() {
        let err: BackendError = StoreError::Duplicate("general".into()).into();
        assert!(matches!(err, BackendError::DuplicateName { ref name } if name == "general"));

        let err: BackendError = StoreError::NotFound("message").into();
        assert_eq!(err.message(), "message not found");
    }
}
