//! In-memory repositories
//!
//! Each repository is a map behind a `tokio::sync::RwLock`. Uniqueness is
//! enforced on exact strings, the same way the database's unique indexes
//! compare them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{GroupRepository, MessageRepository, StoreError, StoreResult, UserRepository};
use crate::backend::auth::users::{SessionEntry, User};
use crate::shared::{ChatGroup, ChatMessage};

/// Groups keyed by ID
#[derive(Default)]
pub struct MemoryGroups {
    groups: RwLock<HashMap<Uuid, ChatGroup>>,
}

#[async_trait]
impl GroupRepository for MemoryGroups {
    async fn insert(&self, group: ChatGroup) -> StoreResult<ChatGroup> {
        let mut groups = self.groups.write().await;
        if groups.values().any(|g| g.name == group.name) {
            return Err(StoreError::Duplicate(group.name));
        }
        groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<ChatGroup>> {
        let groups = self.groups.read().await;
        Ok(groups.values().find(|g| g.name == name).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ChatGroup>> {
        Ok(self.groups.read().await.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<ChatGroup>> {
        let mut groups: Vec<ChatGroup> = self.groups.read().await.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn set_password_hash(&self, name: &str, password_hash: String) -> StoreResult<()> {
        let mut groups = self.groups.write().await;
        let group = groups
            .values_mut()
            .find(|g| g.name == name)
            .ok_or(StoreError::NotFound("group"))?;
        group.password_hash = password_hash;
        Ok(())
    }

    async fn add_member(&self, name: &str, user_id: &str) -> StoreResult<()> {
        let mut groups = self.groups.write().await;
        let group = groups
            .values_mut()
            .find(|g| g.name == name)
            .ok_or(StoreError::NotFound("group"))?;
        group.members.insert(user_id.to_string());
        Ok(())
    }

    async fn remove_member(&self, id: Uuid, user_id: &str) -> StoreResult<ChatGroup> {
        let mut groups = self.groups.write().await;
        let group = groups.get_mut(&id).ok_or(StoreError::NotFound("group"))?;
        group.members.remove(user_id);
        Ok(group.clone())
    }

    async fn rename(&self, id: Uuid, new_name: &str) -> StoreResult<ChatGroup> {
        let mut groups = self.groups.write().await;
        if !groups.contains_key(&id) {
            return Err(StoreError::NotFound("group"));
        }
        if groups.values().any(|g| g.id != id && g.name == new_name) {
            return Err(StoreError::Duplicate(new_name.to_string()));
        }
        let group = groups.get_mut(&id).ok_or(StoreError::NotFound("group"))?;
        group.name = new_name.to_string();
        Ok(group.clone())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<ChatGroup> {
        self.groups
            .write()
            .await
            .remove(&id)
            .ok_or(StoreError::NotFound("group"))
    }
}

/// Messages keyed by ID
#[derive(Default)]
pub struct MemoryMessages {
    messages: RwLock<HashMap<Uuid, ChatMessage>>,
}

#[async_trait]
impl MessageRepository for MemoryMessages {
    async fn insert(&self, message: ChatMessage) -> StoreResult<ChatMessage> {
        self.messages.write().await.insert(message.id, message.clone());
        Ok(message)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<ChatMessage>> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn in_range(
        &self,
        group: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<ChatMessage>> {
        let messages = self.messages.read().await;
        let mut matching: Vec<ChatMessage> = messages
            .values()
            .filter(|m| m.group == group && m.timestamp >= from && m.timestamp < to)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn update_text(&self, id: Uuid, text: &str) -> StoreResult<ChatMessage> {
        let mut messages = self.messages.write().await;
        let message = messages.get_mut(&id).ok_or(StoreError::NotFound("message"))?;
        message.message = text.to_string();
        message.edited = true;
        Ok(message.clone())
    }

    async fn toggle_reaction(
        &self,
        id: Uuid,
        user_id: &str,
        emoji: &str,
    ) -> StoreResult<ChatMessage> {
        let mut messages = self.messages.write().await;
        let message = messages.get_mut(&id).ok_or(StoreError::NotFound("message"))?;
        message.toggle_reaction(user_id, emoji);
        Ok(message.clone())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<ChatMessage> {
        self.messages
            .write()
            .await
            .remove(&id)
            .ok_or(StoreError::NotFound("message"))
    }

    async fn reassign_group(&self, from: &str, to: &str) -> StoreResult<u64> {
        let mut messages = self.messages.write().await;
        let mut moved = 0;
        for message in messages.values_mut().filter(|m| m.group == from) {
            message.group = to.to_string();
            moved += 1;
        }
        Ok(moved)
    }

    async fn delete_group(&self, group: &str) -> StoreResult<u64> {
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|_, m| m.group != group);
        Ok((before - messages.len()) as u64)
    }
}

/// Users keyed by ID
#[derive(Default)]
pub struct MemoryUsers {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn insert(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if let Some(taken) = users.values().find_map(|u| {
            if u.username == user.username {
                Some(user.username.clone())
            } else if u.email == user.email {
                Some(user.email.clone())
            } else {
                None
            }
        }) {
            return Err(StoreError::Duplicate(taken));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_many(&self, ids: &[String]) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn increment_message_count(&self, id: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(StoreError::NotFound("user"))?;
        user.message_count += 1;
        Ok(())
    }

    async fn record_session(
        &self,
        id: &str,
        entry: SessionEntry,
        cap: usize,
    ) -> StoreResult<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(StoreError::NotFound("user"))?;
        user.push_session(entry, cap);
        Ok(user.clone())
    }
}
