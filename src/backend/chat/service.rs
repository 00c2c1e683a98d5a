/**
 * Message Store Service
 *
 * Creates, lists, edits, deletes and reacts to chat messages, publishing a
 * room event after every successful mutation.
 *
 * # Authorization
 *
 * - Edit: the author only, and only while `now - timestamp <= edit window`
 * - Delete: the admin identity only, whoever wrote the message
 *
 * # Author counter
 *
 * `create` bumps the author's message counter after the message is stored.
 * The two writes are independent; a failed counter update is logged and the
 * message stays.
 */

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AdminIdentity;
use crate::backend::realtime::RoomBroadcaster;
use crate::backend::store::{MessageRepository, StoreError, UserRepository};
use crate::shared::error::require;
use crate::shared::message::{
    validate_emoji, validate_message_text, validate_new_message, MessageView,
};
use crate::shared::config::{MAX_EDIT_WINDOW_SECS, MAX_HISTORY_LIMIT};
use crate::shared::{ChatMessage, Reaction, ServerEvent, SharedError};

/// Parse a `YYYY-MM-DD` day; `None` means the current UTC day
pub fn parse_day(day: Option<&str>, now: DateTime<Utc>) -> Result<NaiveDate, SharedError> {
    match day.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(now.date_naive()),
        Some(day) => NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| {
            SharedError::validation("day", format!("day must be YYYY-MM-DD, got '{}'", day))
        }),
    }
}

/// `[day 00:00, next day 00:00)` in UTC
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    broadcaster: Arc<RoomBroadcaster>,
    admin: AdminIdentity,
    edit_window: Duration,
    history_limit: usize,
}

impl MessageService {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        broadcaster: Arc<RoomBroadcaster>,
        admin: AdminIdentity,
        edit_window_secs: i64,
        history_limit: usize,
    ) -> Self {
        Self {
            messages,
            users,
            broadcaster,
            admin,
            edit_window: Duration::seconds(edit_window_secs.clamp(0, MAX_EDIT_WINDOW_SECS)),
            history_limit: history_limit.clamp(1, MAX_HISTORY_LIMIT),
        }
    }

    /// Store a new message stamped with the current time
    pub async fn create(
        &self,
        group: &str,
        user_id: &str,
        username: &str,
        text: &str,
    ) -> BackendResult<ChatMessage> {
        self.create_at(group, user_id, username, text, Utc::now()).await
    }

    /// Store a new message stamped with `timestamp`
    pub async fn create_at(
        &self,
        group: &str,
        user_id: &str,
        username: &str,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> BackendResult<ChatMessage> {
        validate_new_message(group, user_id, username, text)?;

        let message = self
            .messages
            .insert(ChatMessage::new(
                group.to_string(),
                user_id.to_string(),
                username.to_string(),
                text.to_string(),
                timestamp,
            ))
            .await?;

        match self.users.increment_message_count(user_id).await {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => {
                tracing::debug!("No account for {}; message counter not updated", user_id);
            }
            Err(e) => tracing::error!("Failed to update message counter for {}: {}", user_id, e),
        }

        self.broadcaster
            .broadcast(&message.group, ServerEvent::Message(message.clone()));
        Ok(message)
    }

    /// Messages of one UTC calendar day, oldest first, with author handles
    pub async fn history_for_day(
        &self,
        group: &str,
        day: NaiveDate,
    ) -> BackendResult<Vec<MessageView>> {
        require("group", group)?;
        let (from, to) = day_bounds(day);
        let messages = self
            .messages
            .in_range(group, from, to, self.history_limit)
            .await?;

        let author_ids: Vec<String> = messages
            .iter()
            .map(|m| m.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let handles: HashMap<String, Option<String>> = self
            .users
            .find_many(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.instagram_handle))
            .collect();

        Ok(messages
            .into_iter()
            .map(|message| {
                let instagram_handle = handles.get(&message.user_id).cloned().flatten();
                MessageView {
                    message,
                    instagram_handle,
                }
            })
            .collect())
    }

    /// History for a `YYYY-MM-DD` day, defaulting to today
    pub async fn history(&self, group: &str, day: Option<&str>) -> BackendResult<Vec<MessageView>> {
        require("group", group)?;
        let day = parse_day(day, Utc::now())?;
        self.history_for_day(group, day).await
    }

    async fn find(&self, id: Uuid) -> BackendResult<ChatMessage> {
        self.messages
            .find(id)
            .await?
            .ok_or(BackendError::not_found("message"))
    }

    /// Edit a message's text as its author
    pub async fn edit(&self, id: Uuid, user_id: &str, text: &str) -> BackendResult<ChatMessage> {
        self.edit_at(id, user_id, text, Utc::now()).await
    }

    /// Edit a message's text as its author, judged at time `now`
    pub async fn edit_at(
        &self,
        id: Uuid,
        user_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> BackendResult<ChatMessage> {
        require("userId", user_id)?;
        validate_message_text(text)?;

        let message = self.find(id).await?;
        if message.user_id != user_id {
            tracing::warn!("User {} attempted to edit message {} of {}", user_id, id, message.user_id);
            return Err(BackendError::unauthorized("Only the author may edit this message"));
        }
        if now - message.timestamp > self.edit_window {
            tracing::warn!("Edit of message {} rejected: window expired", id);
            return Err(BackendError::EditWindowExpired);
        }

        let updated = self.messages.update_text(id, text).await?;
        self.broadcaster.broadcast(
            &updated.group,
            ServerEvent::MessageEdited {
                id: updated.id,
                message: updated.message.clone(),
            },
        );
        Ok(updated)
    }

    /// Delete a message as the admin
    pub async fn delete(&self, id: Uuid, requester_email: &str) -> BackendResult<()> {
        if !self.admin.matches(requester_email) {
            tracing::warn!("Non-admin {} attempted to delete message {}", requester_email, id);
            return Err(BackendError::unauthorized("Only the admin may delete messages"));
        }

        let deleted = self.messages.delete(id).await?;
        tracing::info!("Message {} in '{}' deleted by admin", id, deleted.group);
        self.broadcaster
            .broadcast(&deleted.group, ServerEvent::MessageDeleted { id });
        Ok(())
    }

    /// Toggle a reaction; returns the message's reactions afterwards
    pub async fn react(&self, id: Uuid, user_id: &str, emoji: &str) -> BackendResult<Vec<Reaction>> {
        require("userId", user_id)?;
        validate_emoji(emoji)?;

        let message = self.messages.toggle_reaction(id, user_id, emoji).await?;
        let added = message
            .reactions
            .iter()
            .any(|r| r.user_id == user_id && r.emoji == emoji);
        tracing::debug!(
            "Reaction {} {} on message {} by {}",
            emoji,
            if added { "added" } else { "removed" },
            id,
            user_id
        );

        self.broadcaster.broadcast(
            &message.group,
            ServerEvent::MessageReacted {
                id,
                reactions: message.reactions.clone(),
            },
        );
        Ok(message.reactions)
    }
}
