//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the HTTP handlers, the socket channel and the storage layer. All types are
//! designed for JSON serialization with the camelCase field names the web
//! client expects.

/// Chat group data structure
pub mod group;

/// Chat message data structure
pub mod message;

/// Socket event system
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use group::ChatGroup;
pub use message::{ChatMessage, Reaction};
pub use event::{ClientEvent, ServerEvent};
pub use error::SharedError;
pub use config::{ServerConfig, ServerConfigBuilder, ConfigError};
