/**
 * Authentication Handler Types
 *
 * Request and response types shared by the signup, login and me handlers.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::auth::users::{SessionEntry, User};

/// Sign up request
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// User's chosen username (3-30 chars, alphanumeric + underscore)
    pub username: String,
    /// User's email address
    pub email: String,
    /// User's password (will be hashed before storage)
    pub password: String,
    /// Optional Instagram handle, with or without the leading `@`
    #[serde(default)]
    pub instagram_handle: Option<String>,
}

/// Login request
///
/// `username` may also be the account's email address.
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Auth response returned by signup and login
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    /// JWT token for authentication (30-day expiration)
    pub token: String,
    pub user: UserResponse,
}

/// Response of `GET /api/auth/me`
#[derive(Serialize, Deserialize, Debug)]
pub struct MeResponse {
    pub user: UserResponse,
}

/// User information that is safe to return to clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub instagram_handle: Option<String>,
    pub message_count: i64,
    pub last_login_at: Option<DateTime<Utc>>,
    pub sessions: Vec<SessionEntry>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            instagram_handle: user.instagram_handle,
            message_count: user.message_count,
            last_login_at: user.last_login_at,
            sessions: user.sessions,
        }
    }
}
