//! Message Store Module
//!
//! Chat messages per group and calendar day, with author edits inside the
//! edit window, admin deletes and emoji reactions.
//!
//! - **`service`** - `MessageService` (validation, authorization, broadcasts)
//! - **`handlers`** - HTTP handlers for `/api/messages`

/// Message service
pub mod service;

/// HTTP handlers
pub mod handlers;

pub use service::MessageService;
