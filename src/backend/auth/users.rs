/**
 * User Model
 *
 * This module defines the user account and its login session history. The
 * persistence lives behind `store::UserRepository`.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session history is trimmed to the newest entries beyond this length
pub const MAX_SESSION_HISTORY: usize = 50;

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID string)
    pub id: String,
    /// Username (unique, 3-30 chars, alphanumeric + underscore)
    pub username: String,
    /// User email address (unique)
    pub email: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Instagram handle shown next to the user's chat messages
    pub instagram_handle: Option<String>,
    /// Number of chat messages posted
    pub message_count: i64,
    /// Login sessions, oldest first
    pub sessions: Vec<SessionEntry>,
    /// Time of the most recent login
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh ID
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        instagram_handle: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            instagram_handle,
            message_count: 0,
            sessions: Vec::new(),
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    /// Append a session, dropping the oldest ones beyond `cap`
    pub fn push_session(&mut self, entry: SessionEntry, cap: usize) {
        self.last_login_at = Some(entry.at);
        self.sessions.push(entry);
        if self.sessions.len() > cap {
            let excess = self.sessions.len() - cap;
            self.sessions.drain(..excess);
        }
    }
}

/// One login, with the client detected from its `User-Agent`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    pub at: DateTime<Utc>,
    pub user_agent: String,
    pub browser: String,
    pub os: String,
    pub device: String,
}

impl SessionEntry {
    /// Build a session entry from a raw `User-Agent` header
    pub fn from_user_agent(user_agent: &str, at: DateTime<Utc>) -> Self {
        Self {
            at,
            user_agent: user_agent.to_string(),
            browser: detect_browser(user_agent).to_string(),
            os: detect_os(user_agent).to_string(),
            device: detect_device(user_agent).to_string(),
        }
    }
}

// Order matters: Edge and Opera also advertise Chrome, Chrome advertises Safari.
fn detect_browser(ua: &str) -> &'static str {
    if ua.contains("Edg/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else {
        "Unknown"
    }
}

fn detect_os(ua: &str) -> &'static str {
    if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("iPhone") || ua.contains("iPad") {
        "iOS"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        "Unknown"
    }
}

fn detect_device(ua: &str) -> &'static str {
    if ua.contains("iPad") || ua.contains("Tablet") {
        "tablet"
    } else if ua.contains("Mobile") || ua.contains("iPhone") || ua.contains("Android") {
        "mobile"
    } else {
        "desktop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const WINDOWS_EDGE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const LINUX_FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

    #[test]
    fn test_detects_clients() {
        let iphone = SessionEntry::from_user_agent(IPHONE_SAFARI, Utc::now());
        assert_eq!(
            (iphone.browser.as_str(), iphone.os.as_str(), iphone.device.as_str()),
            ("Safari", "iOS", "mobile")
        );

        let edge = SessionEntry::from_user_agent(WINDOWS_EDGE, Utc::now());
        assert_eq!((edge.browser.as_str(), edge.os.as_str()), ("Edge", "Windows"));
        assert_eq!(edge.device, "desktop");

        let firefox = SessionEntry::from_user_agent(LINUX_FIREFOX, Utc::now());
        assert_eq!((firefox.browser.as_str(), firefox.os.as_str()), ("Firefox", "Linux"));
    }

    #[test]
    fn test_unknown_client() {
        let entry = SessionEntry::from_user_agent("curl/8.4.0", Utc::now());
        assert_eq!(entry.browser, "Unknown");
        assert_eq!(entry.os, "Unknown");
        assert_eq!(entry.device, "desktop");
    }

    #[test]
    fn test_session_history_is_capped() {
        let mut user = User::new("kelly".into(), "k@surf.test".into(), "h".into(), None);
        for i in 0..(MAX_SESSION_HISTORY + 7) {
            let entry = SessionEntry::from_user_agent(&format!("agent-{}", i), Utc::now());
            user.push_session(entry, MAX_SESSION_HISTORY);
        }
        assert_eq!(user.sessions.len(), MAX_SESSION_HISTORY);
        assert_eq!(user.sessions[0].user_agent, "agent-7");
        assert_eq!(
            user.sessions.last().unwrap().user_agent,
            format!("agent-{}", MAX_SESSION_HISTORY + 6)
        );
        assert!(user.last_login_at.is_some());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("kelly".into(), "k@surf.test".into(), "secret".into(), None);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["username"], "kelly");
    }
}
