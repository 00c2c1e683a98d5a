/**
 * Group Registry
 *
 * Password-gated chat groups. Creation is open to any user; password changes
 * are limited to the group's creator or the admin; member removal, rename
 * and delete are admin-only.
 *
 * # Cross-entity writes
 *
 * Rename re-points the group's messages and moves its live room after the
 * group row is renamed. Delete purges messages after the group row is gone.
 * These are independent writes: a failure between them leaves messages
 * under the old name (rename) or orphaned (delete) and is logged.
 */

use std::sync::Arc;

use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AdminIdentity;
use crate::backend::realtime::RoomBroadcaster;
use crate::backend::store::{GroupRepository, MessageRepository, UserRepository};
use crate::shared::error::require;
use crate::shared::group::{validate_group_name, validate_group_password};
use crate::shared::{ChatGroup, ServerEvent};

pub struct GroupRegistry {
    groups: Arc<dyn GroupRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    broadcaster: Arc<RoomBroadcaster>,
    admin: AdminIdentity,
    bcrypt_cost: u32,
}

impl GroupRegistry {
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        broadcaster: Arc<RoomBroadcaster>,
        admin: AdminIdentity,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            groups,
            messages,
            users,
            broadcaster,
            admin,
            bcrypt_cost,
        }
    }

    async fn find(&self, name: &str) -> BackendResult<ChatGroup> {
        self.groups
            .find_by_name(name)
            .await?
            .ok_or(BackendError::not_found("group"))
    }

    async fn find_by_id(&self, id: Uuid) -> BackendResult<ChatGroup> {
        self.groups
            .find_by_id(id)
            .await?
            .ok_or(BackendError::not_found("group"))
    }

    /// Whether `user_id` resolves to the admin identity
    async fn is_admin(&self, user_id: &str) -> BackendResult<bool> {
        let user = self.users.find_by_id(user_id).await?;
        Ok(user.is_some_and(|u| self.admin.matches(&u.email)))
    }

    async fn require_admin(&self, user_id: &str, action: &str) -> BackendResult<()> {
        require("userId", user_id)?;
        if self.is_admin(user_id).await? {
            Ok(())
        } else {
            tracing::warn!("Non-admin user {} attempted to {}", user_id, action);
            Err(BackendError::unauthorized(format!(
                "Only the admin may {}",
                action
            )))
        }
    }

    /// Create a group; the creator becomes its first member
    pub async fn create(
        &self,
        name: &str,
        password: &str,
        creator: &str,
    ) -> BackendResult<ChatGroup> {
        validate_group_name(name)?;
        validate_group_password("password", password)?;
        require("userId", creator)?;

        let password_hash = bcrypt::hash(password, self.bcrypt_cost)?;
        let group = self
            .groups
            .insert(ChatGroup::new(
                name.to_string(),
                password_hash,
                creator.to_string(),
            ))
            .await?;

        tracing::info!("Group '{}' created by {}", group.name, creator);
        Ok(group)
    }

    /// Replace a group's password
    pub async fn change_password(
        &self,
        name: &str,
        new_password: &str,
        requester: &str,
    ) -> BackendResult<()> {
        require("group", name)?;
        validate_group_password("newPassword", new_password)?;
        require("userId", requester)?;

        let group = self.find(name).await?;
        if group.created_by != requester && !self.is_admin(requester).await? {
            tracing::warn!("User {} may not change the password of '{}'", requester, name);
            return Err(BackendError::unauthorized(
                "Only the group creator or the admin may change the password",
            ));
        }

        let password_hash = bcrypt::hash(new_password, self.bcrypt_cost)?;
        self.groups.set_password_hash(name, password_hash).await?;
        tracing::info!("Password of group '{}' changed by {}", name, requester);
        Ok(())
    }

    /// Check a group password
    pub async fn verify_password(&self, name: &str, password: &str) -> BackendResult<ChatGroup> {
        require("group", name)?;
        require("password", password)?;

        let group = self.find(name).await?;
        if !bcrypt::verify(password, &group.password_hash)? {
            tracing::warn!("Wrong password for group '{}'", name);
            return Err(BackendError::forbidden("Incorrect group password"));
        }
        Ok(group)
    }

    /// Check the password and, when a user is given, add them as a member
    pub async fn join(&self, name: &str, password: &str, user_id: Option<&str>) -> BackendResult<()> {
        self.verify_password(name, password).await?;
        if let Some(user_id) = user_id.filter(|id| !id.trim().is_empty()) {
            self.groups.add_member(name, user_id).await?;
            tracing::info!("User {} joined group '{}'", user_id, name);
        }
        Ok(())
    }

    pub async fn is_member(&self, name: &str, user_id: &str) -> BackendResult<bool> {
        require("group", name)?;
        require("userId", user_id)?;
        Ok(self.find(name).await?.is_member(user_id))
    }

    pub async fn add_member(&self, name: &str, user_id: &str) -> BackendResult<()> {
        require("group", name)?;
        require("userId", user_id)?;
        self.groups.add_member(name, user_id).await?;
        Ok(())
    }

    /// Remove a member (admin only)
    pub async fn remove_member(
        &self,
        group_id: Uuid,
        member_id: &str,
        requester: &str,
    ) -> BackendResult<ChatGroup> {
        require("memberId", member_id)?;
        self.require_admin(requester, "remove members").await?;

        let group = self.groups.remove_member(group_id, member_id).await?;
        tracing::info!("User {} removed from group '{}'", member_id, group.name);
        Ok(group)
    }

    /// All groups ordered by name
    pub async fn list(&self) -> BackendResult<Vec<ChatGroup>> {
        Ok(self.groups.list().await?)
    }

    /// Rename a group (admin only)
    pub async fn rename(
        &self,
        group_id: Uuid,
        new_name: &str,
        requester: &str,
    ) -> BackendResult<ChatGroup> {
        validate_group_name(new_name)?;
        self.require_admin(requester, "rename groups").await?;

        let old_name = self.find_by_id(group_id).await?.name;
        let group = self.groups.rename(group_id, new_name).await?;
        if old_name == group.name {
            return Ok(group);
        }

        match self.messages.reassign_group(&old_name, &group.name).await {
            Ok(moved) => tracing::info!(
                "Group '{}' renamed to '{}' ({} messages moved)",
                old_name,
                group.name,
                moved
            ),
            Err(e) => {
                tracing::error!(
                    "Group '{}' renamed to '{}' but its messages were not moved: {}",
                    old_name,
                    group.name,
                    e
                );
                return Err(e.into());
            }
        }

        self.broadcaster.rename_room(&old_name, &group.name);
        self.broadcaster.broadcast(
            &group.name,
            ServerEvent::GroupRenamed {
                from: old_name,
                to: group.name.clone(),
            },
        );
        Ok(group)
    }

    /// Delete a group and its messages (admin only)
    pub async fn delete(&self, group_id: Uuid, requester: &str) -> BackendResult<()> {
        self.require_admin(requester, "delete groups").await?;

        let group = self.groups.delete(group_id).await?;
        match self.messages.delete_group(&group.name).await {
            Ok(purged) => tracing::info!("Group '{}' deleted ({} messages purged)", group.name, purged),
            Err(e) => {
                tracing::error!("Group '{}' deleted but its messages were not purged: {}", group.name, e);
                return Err(e.into());
            }
        }

        self.broadcaster.broadcast(
            &group.name,
            ServerEvent::GroupDeleted {
                group: group.name.clone(),
            },
        );
        self.broadcaster.close_room(&group.name);
        Ok(())
    }
}
