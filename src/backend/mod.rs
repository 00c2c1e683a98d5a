//! Backend Module
//!
//! This module contains all server-side code for the SurfChat service: the
//! group registry, the message store and the live fan-out over WebSockets.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`store`** - Repository traits with in-memory and PostgreSQL backends
//! - **`groups`** - Group registry and its handlers
//! - **`chat`** - Message service and its handlers
//! - **`realtime`** - Per-group rooms and the chat socket
//! - **`auth`** - User accounts, JWT tokens, session history
//! - **`middleware`** - Caller identity extractors and the admin identity
//! - **`error`** - Backend error type and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── store/          - Repositories
//! ├── groups/         - Group registry
//! ├── chat/           - Message store
//! ├── realtime/       - Rooms and socket
//! ├── auth/           - Authentication
//! ├── middleware/     - Request extractors
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the configuration, the repositories, the broadcaster and
//! the two services. Services take their repositories as `Arc<dyn ...>`, so
//! the same code runs over PostgreSQL in production and over the in-memory
//! store in tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use surfchat::backend::server::create_app;
//! use surfchat::shared::ServerConfig;
//!
//! # async fn example() {
//! let app = create_app(ServerConfig::default()).await;
//! // Use app with axum::serve
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Repository traits and backends
pub mod store;

/// Group registry
pub mod groups;

/// Message store
pub mod chat;

/// Live fan-out
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Request extractors
pub mod middleware;

/// Re-export commonly used types
pub use chat::MessageService;
pub use error::BackendError;
pub use groups::GroupRegistry;
pub use realtime::RoomBroadcaster;
pub use server::{build_app, create_app, AppState};
