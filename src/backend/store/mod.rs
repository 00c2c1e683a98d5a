//! Storage Module
//!
//! Every persisted entity sits behind a repository trait so that the domain
//! services don't know which backend they run on.
//!
//! # Backends
//!
//! - **`memory`** - `tokio::sync::RwLock` maps; used when `DATABASE_URL` is
//!   not configured and by the test suite
//! - **`postgres`** - `sqlx` queries against the tables created by the
//!   embedded migrations
//!
//! # Consistency
//!
//! Each repository call is a single round trip. Nothing here spans entities:
//! callers that touch two repositories (message create + author counter,
//! group rename + message re-pointing) do so with independent writes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::users::{SessionEntry, User};
use crate::shared::{ChatGroup, ChatMessage};

/// In-memory backend
pub mod memory;

/// PostgreSQL backend
pub mod postgres;

/// Storage failure
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the value
    #[error("duplicate value '{0}'")]
    Duplicate(String),

    /// The addressed record does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The database returned an error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result alias for repository calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Chat group persistence
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Insert a new group; `Duplicate` when the name is taken
    async fn insert(&self, group: ChatGroup) -> StoreResult<ChatGroup>;

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<ChatGroup>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ChatGroup>>;

    /// All groups ordered by name
    async fn list(&self) -> StoreResult<Vec<ChatGroup>>;

    async fn set_password_hash(&self, name: &str, password_hash: String) -> StoreResult<()>;

    /// Add a member; adding an existing member is a no-op
    async fn add_member(&self, name: &str, user_id: &str) -> StoreResult<()>;

    /// Remove a member and return the updated group
    async fn remove_member(&self, id: Uuid, user_id: &str) -> StoreResult<ChatGroup>;

    /// Rename a group; `Duplicate` when the new name is taken
    async fn rename(&self, id: Uuid, new_name: &str) -> StoreResult<ChatGroup>;

    /// Delete a group and return what was removed
    async fn delete(&self, id: Uuid) -> StoreResult<ChatGroup>;
}

/// Chat message persistence
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: ChatMessage) -> StoreResult<ChatMessage>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<ChatMessage>>;

    /// Messages of `group` with `from <= timestamp < to`, oldest first, at
    /// most `limit` of them
    async fn in_range(
        &self,
        group: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<ChatMessage>>;

    /// Replace the text and set the edited flag
    async fn update_text(&self, id: Uuid, text: &str) -> StoreResult<ChatMessage>;

    /// Add the `{emoji, user_id}` reaction if absent, remove it if present,
    /// as one atomic step; returns the message afterwards
    async fn toggle_reaction(&self, id: Uuid, user_id: &str, emoji: &str)
        -> StoreResult<ChatMessage>;

    /// Delete a message and return what was removed
    async fn delete(&self, id: Uuid) -> StoreResult<ChatMessage>;

    /// Move every message of `from` to `to`; returns the number moved
    async fn reassign_group(&self, from: &str, to: &str) -> StoreResult<u64>;

    /// Delete every message of `group`; returns the number deleted
    async fn delete_group(&self, group: &str) -> StoreResult<u64>;
}

/// User account persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; `Duplicate` when the username or email is taken
    async fn insert(&self, user: User) -> StoreResult<User>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Users whose id is in `ids`, in no particular order and without their
    /// session history
    async fn find_many(&self, ids: &[String]) -> StoreResult<Vec<User>>;

    async fn increment_message_count(&self, id: &str) -> StoreResult<()>;

    /// Append a login session, keep the newest `cap` entries and stamp the
    /// last login time
    async fn record_session(&self, id: &str, entry: SessionEntry, cap: usize)
        -> StoreResult<User>;
}

/// The repositories the server runs on
#[derive(Clone)]
pub struct Stores {
    pub groups: Arc<dyn GroupRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Stores {
    /// Fresh, empty in-memory repositories
    pub fn in_memory() -> Self {
        Self {
            groups: Arc::new(memory::MemoryGroups::default()),
            messages: Arc::new(memory::MemoryMessages::default()),
            users: Arc::new(memory::MemoryUsers::default()),
        }
    }

    /// Repositories backed by a PostgreSQL pool
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            groups: Arc::new(postgres::PgGroups::new(pool.clone())),
            messages: Arc::new(postgres::PgMessages::new(pool.clone())),
            users: Arc::new(postgres::PgUsers::new(pool)),
        }
    }
}
