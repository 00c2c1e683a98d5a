//! SurfChat - Main Library
//!
//! Real-time group chat for a surf-cam site: password-protected groups,
//! per-day message history with a short author edit window, admin moderation,
//! and live delivery of every change over a WebSocket.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between handlers, the socket and storage
//!   - Group and message records, socket events
//!   - Configuration and validation errors
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and WebSocket endpoint
//!   - Group registry, message service, per-group broadcast rooms
//!   - Authentication and PostgreSQL persistence
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server build (enabled by default)
//!
//! # Usage
//!
//! ```rust,no_run
//! use surfchat::backend::server::create_app;
//! use surfchat::shared::ServerConfig;
//!
//! # async fn example() {
//! let app = create_app(ServerConfig::default()).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Repositories are `Send + Sync` trait objects; rooms are
//! `tokio::sync::broadcast` channels shared behind `Arc`.
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation and event parsing
//! - `backend::error::BackendError` for everything a handler returns

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
