//! Authentication Module
//!
//! User accounts, login sessions and JWT tokens.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and session history
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//!     ├── types.rs    - Request/response types
//!     ├── signup.rs   - User registration handler
//!     ├── login.rs    - User authentication handler
//!     └── me.rs       - Get current user handler
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: username, email and password → user created → JWT token returned
//! 2. **Login**: username (or email) and password → session recorded → JWT token returned
//! 3. **Get Me**: JWT token → user info returned
//!
//! Group admin operations don't use tokens: they resolve the request's
//! `userId` to an account and compare its email with the admin identity.

/// User data model
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{get_me, login, signup};
pub use handlers::types::{AuthResponse, LoginRequest, SignupRequest, UserResponse};
