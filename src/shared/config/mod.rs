//! Application configuration module
//!
//! `ServerConfig` is assembled in three layers: built-in defaults, an
//! optional TOML file, then environment variables. The builder is used by
//! tests to set only the fields they care about.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Address with destructive authority when `ADMIN_EMAIL` is not set
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@surfcam.live";

/// Longest accepted author edit window (one day)
pub const MAX_EDIT_WINDOW_SECS: i64 = 86_400;

/// A history query never returns more than this many messages
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Secret used when `JWT_SECRET` is not set
pub const DEVELOPMENT_JWT_SECRET: &str = "surfchat-development-secret";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on
    pub port: u16,
    /// PostgreSQL connection string; in-memory storage when absent
    pub database_url: Option<String>,
    /// The single admin identity, compared verbatim
    pub admin_email: String,
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    /// bcrypt cost for group and account passwords
    pub bcrypt_cost: u32,
    /// How long after creation the author may edit a message
    pub edit_window_secs: i64,
    /// Maximum messages returned by a history query
    pub history_limit: usize,
    /// Per-room broadcast buffer
    pub room_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            bcrypt_cost: 12,
            edit_window_secs: 300,
            history_limit: 100,
            room_capacity: 100,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Parse a configuration from TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from the file named by `SURFCHAT_CONFIG` (if any), then apply
    /// environment overrides and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("SURFCHAT_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        let config = base.with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests)
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SERVER_PORT") {
            self.port = parse_var("SERVER_PORT", &port)?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url).filter(|u| !u.is_empty());
        }
        if let Some(email) = lookup("ADMIN_EMAIL") {
            self.admin_email = email;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(cost) = lookup("BCRYPT_COST") {
            self.bcrypt_cost = parse_var("BCRYPT_COST", &cost)?;
        }
        if let Some(secs) = lookup("EDIT_WINDOW_SECS") {
            self.edit_window_secs = parse_var("EDIT_WINDOW_SECS", &secs)?;
        }
        if let Some(limit) = lookup("HISTORY_LIMIT") {
            self.history_limit = parse_var("HISTORY_LIMIT", &limit)?;
        }
        if let Some(capacity) = lookup("ROOM_CAPACITY") {
            self.room_capacity = parse_var("ROOM_CAPACITY", &capacity)?;
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".into()));
        }
        if !self.admin_email.contains('@') {
            return Err(ConfigError::Invalid(format!(
                "admin email '{}' is not an email address",
                self.admin_email
            )));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "bcrypt cost {} outside 4..=31",
                self.bcrypt_cost
            )));
        }
        if !(0..=MAX_EDIT_WINDOW_SECS).contains(&self.edit_window_secs) {
            return Err(ConfigError::Invalid(format!(
                "edit window {}s outside 0..={}",
                self.edit_window_secs, MAX_EDIT_WINDOW_SECS
            )));
        }
        if !(1..=MAX_HISTORY_LIMIT).contains(&self.history_limit) {
            return Err(ConfigError::Invalid(format!(
                "history limit {} outside 1..={}",
                self.history_limit, MAX_HISTORY_LIMIT
            )));
        }
        if self.room_capacity == 0 {
            return Err(ConfigError::Invalid("room capacity must be non-zero".into()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key, value.to_string()))
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn admin_email(mut self, email: impl Into<String>) -> Self {
        self.config.admin_email = email.into();
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.config.bcrypt_cost = cost;
        self
    }

    pub fn edit_window_secs(mut self, secs: i64) -> Self {
        self.config.edit_window_secs = secs;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    pub fn room_capacity(mut self, capacity: usize) -> Self {
        self.config.room_capacity = capacity;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("invalid value for {0}: '{1}'")]
    InvalidValue(&'static str, String),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("failed to read configuration: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.admin_email, DEFAULT_ADMIN_EMAIL);
        assert_eq!(config.edit_window_secs, 300);
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_toml_keeps_missing_defaults() {
        let config = ServerConfig::from_toml_str("port = 8080\nadmin_email = \"boss@surf.test\"\n")
            .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.admin_email, "boss@surf.test");
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ADMIN_EMAIL", "ops@surf.test"),
            ("BCRYPT_COST", "4"),
            ("DATABASE_URL", ""),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::default()
            .with_env_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.admin_email, "ops@surf.test");
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_bad_env_value() {
        let result = ServerConfig::default().with_env_overrides(|k| {
            (k == "SERVER_PORT").then(|| "eighty".to_string())
        });
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidValue("SERVER_PORT", "eighty".into())
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ServerConfig::builder().admin_email("nobody").build().is_err());
        assert!(ServerConfig::builder().bcrypt_cost(2).build().is_err());
        assert!(ServerConfig::builder().port(0).build().is_err());
        assert!(ServerConfig::builder().bcrypt_cost(4).build().is_ok());
    }

    #[test]
    fn test_validate_bounds_window_and_history() {
        assert!(ServerConfig::builder().edit_window_secs(-1).build().is_err());
        assert!(ServerConfig::builder().edit_window_secs(i64::MAX).build().is_err());
        assert!(ServerConfig::builder()
            .edit_window_secs(MAX_EDIT_WINDOW_SECS)
            .build()
            .is_ok());

        assert!(ServerConfig::builder().history_limit(0).build().is_err());
        assert!(ServerConfig::builder().history_limit(101).build().is_err());
        assert!(ServerConfig::builder()
            .history_limit(MAX_HISTORY_LIMIT)
            .build()
            .is_ok());
    }
}
