//! Chat Group Data Structures
//!
//! A group is a named chat room with password-gated membership. Group names
//! are unique by exact string comparison; `Surf` and `surf` are two groups.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::{require_bounded, SharedError};

/// Longest accepted group name
pub const MAX_GROUP_NAME_LENGTH: usize = 64;

/// Longest accepted group password
pub const MAX_GROUP_PASSWORD_LENGTH: usize = 128;

/// A chat group as stored
///
/// The password hash is skipped on serialization so a group can be returned
/// to clients as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatGroup {
    /// Unique group ID
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Unique group name, also the live room key
    pub name: String,
    /// bcrypt hash of the group password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// User IDs of the members
    pub members: BTreeSet<String>,
    /// User ID of the creator
    pub created_by: String,
    /// When the group was created
    pub created_at: DateTime<Utc>,
}

impl ChatGroup {
    /// Create a new group with the creator as its only member
    pub fn new(name: String, password_hash: String, created_by: String) -> Self {
        let mut members = BTreeSet::new();
        members.insert(created_by.clone());
        Self {
            id: Uuid::new_v4(),
            name,
            password_hash,
            members,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Whether `user_id` is a member of this group
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.contains(user_id)
    }
}

/// Validate a group name
pub fn validate_group_name(name: &str) -> Result<(), SharedError> {
    require_bounded("name", name, MAX_GROUP_NAME_LENGTH)?;
    if name.trim() != name {
        return Err(SharedError::validation(
            "name",
            "name must not start or end with whitespace",
        ));
    }
    Ok(())
}

/// Validate a group password
pub fn validate_group_password(field: &str, password: &str) -> Result<(), SharedError> {
    require_bounded(field, password, MAX_GROUP_PASSWORD_LENGTH)
}

/// Request to create a group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub user_id: String,
}

/// Request to change a group password
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub user_id: String,
}

/// Request to join a group
///
/// `user_id` is optional: without it the request only checks the password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupRequest {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Query for the membership check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipQuery {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub user_id: String,
}

/// Admin request to remove a member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMemberRequest {
    pub group_id: Uuid,
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub user_id: String,
}

/// Admin request to rename a group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameGroupRequest {
    pub group_id: Uuid,
    #[serde(default)]
    pub new_name: String,
    #[serde(default)]
    pub user_id: String,
}

/// Admin request to delete a group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGroupRequest {
    pub group_id: Uuid,
    #[serde(default)]
    pub user_id: String,
}

/// Bare success response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Response carrying a single group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResponse {
    pub success: bool,
    pub group: ChatGroup,
}

/// Response for listing groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListGroupsResponse {
    pub success: bool,
    pub groups: Vec<ChatGroup>,
}

/// Response for the membership check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub success: bool,
    pub is_member: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_group_has_creator_as_member() {
        let group = ChatGroup::new("general".into(), "hash".into(), "u1".into());
        assert!(group.is_member("u1"));
        assert!(!group.is_member("u2"));
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let group = ChatGroup::new("general".into(), "secret-hash".into(), "u1".into());
        let json = serde_json::to_value(&group).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["name"], "general");
        assert_eq!(json["createdBy"], "u1");
        assert!(json.get("_id").is_some());
    }

    #[test]
    fn test_validate_group_name() {
        assert!(validate_group_name("Pipeline Cam").is_ok());
        assert!(validate_group_name("").is_err());
        assert!(validate_group_name(" padded").is_err());
        assert!(validate_group_name(&"x".repeat(MAX_GROUP_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_join_request_user_id_is_optional() {
        let request: JoinGroupRequest =
            serde_json::from_str(r#"{"group":"general","password":"pw"}"#).unwrap();
        assert!(request.user_id.is_none());
    }
}
