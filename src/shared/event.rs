/**
 * Socket Event System
 *
 * This module defines the events exchanged over the chat socket. Every frame
 * is a JSON text frame of the form `{"event": "<name>", "data": {...}}`.
 *
 * Client to server: `join`, `leave`, `message`.
 * Server to client: `joined`, `message`, `messageEdited`, `messageDeleted`,
 * `messageReacted`, `groupRenamed`, `groupDeleted`, `error`.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::message::{ChatMessage, Reaction};

/// Payload of a `join` event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub group: String,
    pub user_id: String,
}

/// Payload of a `leave` event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeavePayload {
    pub group: String,
}

/// Payload of a client `message` event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendPayload {
    pub group: String,
    pub user_id: String,
    pub username: String,
    pub message: String,
}

/// Event sent by a client over the socket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Subscribe to a group's room
    Join(JoinPayload),
    /// Unsubscribe from a group's room
    Leave(LeavePayload),
    /// Post a message to a group
    Message(SendPayload),
}

impl ClientEvent {
    /// Parse a text frame into a client event
    pub fn parse(frame: &str) -> Result<Self, SharedError> {
        serde_json::from_str(frame)
            .map_err(|e| SharedError::event(format!("unrecognized event: {}", e)))
    }
}

/// Event pushed by the server to the subscribers of a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Acknowledges a `join`
    Joined { group: String },
    /// A new message was posted
    Message(ChatMessage),
    /// A message was edited by its author
    MessageEdited {
        #[serde(rename = "_id")]
        id: Uuid,
        message: String,
    },
    /// A message was deleted by the admin
    MessageDeleted {
        #[serde(rename = "_id")]
        id: Uuid,
    },
    /// A message's reactions changed
    MessageReacted {
        #[serde(rename = "_id")]
        id: Uuid,
        reactions: Vec<Reaction>,
    },
    /// The group was renamed; the room now lives under `to`
    GroupRenamed { from: String, to: String },
    /// The group was deleted; the room is closed after this event
    GroupDeleted { group: String },
    /// A client event was rejected
    Error { message: String },
}

impl ServerEvent {
    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "joined",
            Self::Message(_) => "message",
            Self::MessageEdited { .. } => "messageEdited",
            Self::MessageDeleted { .. } => "messageDeleted",
            Self::MessageReacted { .. } => "messageReacted",
            Self::GroupRenamed { .. } => "groupRenamed",
            Self::GroupDeleted { .. } => "groupDeleted",
            Self::Error { .. } => "error",
        }
    }

    /// Create an error event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize to a text frame
    pub fn to_frame(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
