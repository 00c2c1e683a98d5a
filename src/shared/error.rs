//! Shared Error Types
//!
//! This module defines error types that are shared between the HTTP handlers,
//! the socket channel and the domain services. These errors represent input
//! problems that can be detected before any store access.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures (missing or malformed fields)
//! - `EventError` - Malformed or unknown socket events
//!
//! # Usage
//!
//! ```rust
//! use surfchat::shared::error::SharedError;
//!
//! let error = SharedError::validation("message", "Message text cannot be empty");
//! ```
use thiserror::Error;

/// Shared error types raised before a request touches storage
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Socket event could not be understood
    #[error("Event error: {message}")]
    EventError {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new event error
    pub fn event(message: impl Into<String>) -> Self {
        Self::EventError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

/// Require a non-blank string field
pub fn require(field: &str, value: &str) -> Result<(), SharedError> {
    if value.trim().is_empty() {
        return Err(SharedError::validation(field, format!("{} is required", field)));
    }
    Ok(())
}

/// Require a non-blank string field no longer than `max` characters
pub fn require_bounded(field: &str, value: &str, max: usize) -> Result<(), SharedError> {
    require(field, value)?;
    if value.chars().count() > max {
        return Err(SharedError::validation(
            field,
            format!("{} must be at most {} characters", field, max),
        ));
    }
    Ok(())
}
