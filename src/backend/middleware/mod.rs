//! Middleware Module
//!
//! Request extractors that identify the caller, and the admin identity used
//! by every destructive operation.
//!
//! - **`auth`** - bearer token and `x-user-id` / `x-user-email` extractors
//! - **`admin`** - the single configured admin email
//! - **`extract`** - `Json` / `Query` / `Path` wrappers rejecting with `BackendError`

pub mod auth;

pub mod admin;

pub mod extract;

pub use admin::AdminIdentity;
pub use auth::{AuthUser, UserEmailHeader, UserIdHeader};
pub use extract::{ApiJson, ApiPath, ApiQuery};
