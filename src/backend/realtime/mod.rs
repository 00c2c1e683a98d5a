//! Live Fan-out Module
//!
//! Per-group broadcast rooms and the WebSocket channel that clients join them
//! through.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - RoomBroadcaster (one channel per group, keyed by name)
//! ├── registry.rs     - Process-wide install / current / shutdown
//! └── socket.rs       - /api/socket WebSocket handler
//! ```
//!
//! # Delivery
//!
//! Best-effort, at-most-once, no acknowledgement or replay. A client that
//! falls behind or disconnects misses events until it re-reads history.
//! There is no ordering guarantee between concurrent writers.

/// Room broadcasting
pub mod broadcast;

/// Process-wide broadcaster registry
pub mod registry;

/// WebSocket handler
pub mod socket;

pub use broadcast::{RoomBroadcaster, RoomId};
pub use socket::socket_handler;
