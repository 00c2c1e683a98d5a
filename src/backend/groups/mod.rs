//! Group Registry Module
//!
//! Password-gated chat groups and their membership.
//!
//! - **`registry`** - `GroupRegistry` service (validation, hashing, admin checks)
//! - **`handlers`** - HTTP handlers for `/api/groups/*`

/// Group service
pub mod registry;

/// HTTP handlers
pub mod handlers;

pub use registry::GroupRegistry;
