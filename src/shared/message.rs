//! Chat Message Data Structure
//!
//! Represents a message posted to a group, along with the request and
//! response types of the message endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::{require, require_bounded, SharedError};

/// Longest accepted message text
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Longest accepted display name
pub const MAX_USERNAME_LENGTH: usize = 100;

/// Longest accepted reaction (a few code points for ZWJ emoji sequences)
pub const MAX_EMOJI_LENGTH: usize = 16;

/// A single emoji reaction left by a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub emoji: String,
    pub user_id: String,
}

/// A message posted to a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message ID
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Name of the group the message was posted to
    pub group: String,
    /// Author's user ID
    pub user_id: String,
    /// Author's display name at the time of posting
    pub username: String,
    /// Message text
    pub message: String,
    /// Set once the author has edited the message
    #[serde(default)]
    pub edited: bool,
    /// Emoji reactions, in the order they were left
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message stamped with `timestamp`
    pub fn new(
        group: String,
        user_id: String,
        username: String,
        message: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group,
            user_id,
            username,
            message,
            edited: false,
            reactions: Vec::new(),
            timestamp,
        }
    }

    /// Toggle a reaction: add it when absent, remove it when present.
    ///
    /// Returns `true` when the reaction was added.
    pub fn toggle_reaction(&mut self, user_id: &str, emoji: &str) -> bool {
        let existing = self
            .reactions
            .iter()
            .position(|r| r.user_id == user_id && r.emoji == emoji);
        match existing {
            Some(index) => {
                self.reactions.remove(index);
                false
            }
            None => {
                self.reactions.push(Reaction {
                    emoji: emoji.to_string(),
                    user_id: user_id.to_string(),
                });
                true
            }
        }
    }
}

/// Validate message text
pub fn validate_message_text(text: &str) -> Result<(), SharedError> {
    require_bounded("message", text, MAX_MESSAGE_LENGTH)
}

/// Validate the fields of a new message
pub fn validate_new_message(
    group: &str,
    user_id: &str,
    username: &str,
    text: &str,
) -> Result<(), SharedError> {
    require("group", group)?;
    require("userId", user_id)?;
    require_bounded("username", username, MAX_USERNAME_LENGTH)?;
    validate_message_text(text)
}

/// Validate a reaction emoji
pub fn validate_emoji(emoji: &str) -> Result<(), SharedError> {
    require_bounded("emoji", emoji, MAX_EMOJI_LENGTH)
}

/// Query for the history endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub group: String,
    /// Calendar day as `YYYY-MM-DD`; today when absent
    #[serde(default)]
    pub day: Option<String>,
}

/// A message as returned by the history endpoint, with the author's
/// Instagram handle joined in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub instagram_handle: Option<String>,
}

/// Response for the history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub messages: Vec<MessageView>,
}

/// Request to edit a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMessageRequest {
    #[serde(default)]
    pub message: String,
}

/// Request to toggle a reaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub emoji: String,
}

/// Response after toggling a reaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactResponse {
    pub success: bool,
    pub reactions: Vec<Reaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChatMessage {
        ChatMessage::new(
            "general".into(),
            "u1".into(),
            "kelly".into(),
            "hello".into(),
            Utc::now(),
        )
    }

    #[test]
    fn test_new_message_is_not_edited() {
        let message = sample();
        assert!(!message.edited);
        assert!(message.reactions.is_empty());
    }

    #[test]
    fn test_serializes_with_mongo_style_id() {
        let message = sample();
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["_id"], message.id.to_string());
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["message"], "hello");
        assert_eq!(json["edited"], false);
    }

    #[test]
    fn test_toggle_reaction() {
        let mut message = sample();
        assert!(message.toggle_reaction("u2", "🤙"));
        assert!(message.toggle_reaction("u3", "🤙"));
        assert_eq!(message.reactions.len(), 2);
        assert!(!message.toggle_reaction("u2", "🤙"));
        assert_eq!(
            message.reactions,
            vec![Reaction {
                emoji: "🤙".into(),
                user_id: "u3".into()
            }]
        );
    }

    #[test]
    fn test_validate_new_message() {
        assert!(validate_new_message("general", "u1", "kelly", "hi").is_ok());
        assert!(validate_new_message("", "u1", "kelly", "hi").is_err());
        assert!(validate_new_message("general", "u1", "kelly", "   ").is_err());
        let long = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(validate_new_message("general", "u1", "kelly", &long).is_err());
    }

    #[test]
    fn test_view_flattens_message() {
        let view = MessageView {
            message: sample(),
            instagram_handle: Some("@kelly".into()),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["message"], "hello");
        assert_eq!(json["instagramHandle"], "@kelly");
    }
}
