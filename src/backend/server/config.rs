/**
 * Server Configuration
 *
 * Loads the `ServerConfig` and connects the optional PostgreSQL database.
 *
 * # Error Handling
 *
 * Database errors are logged but do not prevent server startup. Without a
 * database the server runs on the in-memory backend.
 */

use sqlx::PgPool;

use crate::backend::store::Stores;
use crate::shared::config::DEVELOPMENT_JWT_SECRET;
use crate::shared::{ConfigError, ServerConfig};

/// Database configuration result
///
/// `None` if the database is not configured or not reachable.
pub type DatabaseConfig = Option<PgPool>;

/// Load the server configuration from defaults, `SURFCHAT_CONFIG` and the
/// environment
pub fn load_config() -> Result<ServerConfig, ConfigError> {
    let config = ServerConfig::load()?;
    if config.jwt_secret == DEVELOPMENT_JWT_SECRET {
        tracing::warn!("JWT_SECRET not set. Using the development secret.");
    }
    Ok(config)
}

/// Connect to the database and run migrations
///
/// Returns `None` when `database_url` is unset or the connection fails.
pub async fn load_database(config: &ServerConfig) -> DatabaseConfig {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory store.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to the in-memory store.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    if let Err(e) = sqlx::migrate!().run(&pool).await {
        tracing::error!("Failed to run database migrations: {}", e);
        tracing::warn!("Falling back to the in-memory store.");
        return None;
    }
    tracing::info!("Database migrations completed successfully");

    Some(pool)
}

/// Repositories for the configured backend
pub async fn load_stores(config: &ServerConfig) -> Stores {
    match load_database(config).await {
        Some(pool) => Stores::postgres(pool),
        None => Stores::in_memory(),
    }
}
