//! Admin identity
//!
//! A single configured email address holds destructive authority over groups
//! and messages. Every admin check in the backend goes through
//! [`AdminIdentity::matches`].

use std::sync::Arc;

/// The configured admin email
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminIdentity {
    email: Arc<str>,
}

impl AdminIdentity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Arc::from(email.into()),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Exact, case-sensitive comparison
    pub fn matches(&self, email: &str) -> bool {
        *self.email == *email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_exactly() {
        let admin = AdminIdentity::new("admin@surfcam.live");
        assert!(admin.matches("admin@surfcam.live"));
        assert!(!admin.matches("Admin@surfcam.live"));
        assert!(!admin.matches(" admin@surfcam.live"));
        assert!(!admin.matches(""));
    }
}
