//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, middleware, fallback
//! └── api_routes.rs   - Group, message, auth and socket endpoints
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use surfchat::backend::routes::create_router;
//! use surfchat::backend::server::AppState;
//! use surfchat::backend::store::Stores;
//! use surfchat::shared::ServerConfig;
//!
//! let app_state = AppState::new(ServerConfig::default(), Stores::in_memory());
//! let router = create_router(app_state);
//! ```

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
