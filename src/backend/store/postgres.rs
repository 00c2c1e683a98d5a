//! PostgreSQL repositories
//!
//! Queries run against the tables created by `migrations/0001_init.sql`.
//! Unique-constraint violations surface as `StoreError::Duplicate`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{GroupRepository, MessageRepository, StoreError, StoreResult, UserRepository};
use crate::backend::auth::users::{SessionEntry, User};
use crate::shared::{ChatGroup, ChatMessage, Reaction};

/// Map a unique violation to `Duplicate(value)`, anything else to `Database`
fn unique_or_db(err: sqlx::Error, value: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(value.to_string())
        }
        _ => StoreError::Database(err),
    }
}

const GROUP_SELECT: &str = r#"
    SELECT g.id, g.name, g.password_hash, g.created_by, g.created_at,
           COALESCE(array_agg(m.user_id) FILTER (WHERE m.user_id IS NOT NULL), '{}') AS members
    FROM chat_groups g
    LEFT JOIN chat_group_members m ON m.group_id = g.id
"#;

fn group_from_row(row: &PgRow) -> ChatGroup {
    ChatGroup {
        id: row.get("id"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        members: row.get::<Vec<String>, _>("members").into_iter().collect(),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

/// Groups in `chat_groups` with members in `chat_group_members`
pub struct PgGroups {
    pool: PgPool,
}

impl PgGroups {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: Uuid) -> StoreResult<Option<ChatGroup>> {
        let sql = format!("{} WHERE g.id = $1 GROUP BY g.id", GROUP_SELECT);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(group_from_row))
    }
}

#[async_trait]
impl GroupRepository for PgGroups {
    async fn insert(&self, group: ChatGroup) -> StoreResult<ChatGroup> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO chat_groups (id, name, password_hash, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.password_hash)
        .bind(&group.created_by)
        .bind(group.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_or_db(e, &group.name))?;

        for member in &group.members {
            sqlx::query("INSERT INTO chat_group_members (group_id, user_id) VALUES ($1, $2)")
                .bind(group.id)
                .bind(member)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(group)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<ChatGroup>> {
        let sql = format!("{} WHERE g.name = $1 GROUP BY g.id", GROUP_SELECT);
        let row = sqlx::query(&sql).bind(name).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ChatGroup>> {
        self.fetch_by_id(id).await
    }

    async fn list(&self) -> StoreResult<Vec<ChatGroup>> {
        let sql = format!("{} GROUP BY g.id ORDER BY g.name", GROUP_SELECT);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn set_password_hash(&self, name: &str, password_hash: String) -> StoreResult<()> {
        let result = sqlx::query("UPDATE chat_groups SET password_hash = $1 WHERE name = $2")
            .bind(password_hash)
            .bind(name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("group"));
        }
        Ok(())
    }

    async fn add_member(&self, name: &str, user_id: &str) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_group_members (group_id, user_id)
            SELECT id, $2 FROM chat_groups WHERE name = $1
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(name)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        // Zero rows is either a missing group or an existing member
        if result.rows_affected() == 0 && self.find_by_name(name).await?.is_none() {
            return Err(StoreError::NotFound("group"));
        }
        Ok(())
    }

    async fn remove_member(&self, id: Uuid, user_id: &str) -> StoreResult<ChatGroup> {
        sqlx::query("DELETE FROM chat_group_members WHERE group_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        self.fetch_by_id(id).await?.ok_or(StoreError::NotFound("group"))
    }

    async fn rename(&self, id: Uuid, new_name: &str) -> StoreResult<ChatGroup> {
        let result = sqlx::query("UPDATE chat_groups SET name = $1 WHERE id = $2")
            .bind(new_name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| unique_or_db(e, new_name))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("group"));
        }
        self.fetch_by_id(id).await?.ok_or(StoreError::NotFound("group"))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<ChatGroup> {
        let group = self.fetch_by_id(id).await?.ok_or(StoreError::NotFound("group"))?;
        sqlx::query("DELETE FROM chat_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(group)
    }
}

const MESSAGE_COLUMNS: &str =
    "id, group_name, user_id, username, message, edited, reactions, created_at";

fn message_from_row(row: &PgRow) -> ChatMessage {
    let reactions: Json<Vec<Reaction>> = row.get("reactions");
    ChatMessage {
        id: row.get("id"),
        group: row.get("group_name"),
        user_id: row.get("user_id"),
        username: row.get("username"),
        message: row.get("message"),
        edited: row.get("edited"),
        reactions: reactions.0,
        timestamp: row.get("created_at"),
    }
}

/// Messages in `chat_messages`
pub struct PgMessages {
    pool: PgPool,
}

impl PgMessages {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessages {
    async fn insert(&self, message: ChatMessage) -> StoreResult<ChatMessage> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, group_name, user_id, username, message, edited, reactions, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id)
        .bind(&message.group)
        .bind(&message.user_id)
        .bind(&message.username)
        .bind(&message.message)
        .bind(message.edited)
        .bind(Json(&message.reactions))
        .bind(message.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(message)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<ChatMessage>> {
        let sql = format!("SELECT {} FROM chat_messages WHERE id = $1", MESSAGE_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(message_from_row))
    }

    async fn in_range(
        &self,
        group: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<ChatMessage>> {
        let sql = format!(
            r#"
            SELECT {} FROM chat_messages
            WHERE group_name = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at ASC
            LIMIT $4
            "#,
            MESSAGE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(group)
            .bind(from)
            .bind(to)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(message_from_row).collect())
    }

    async fn update_text(&self, id: Uuid, text: &str) -> StoreResult<ChatMessage> {
        let sql = format!(
            "UPDATE chat_messages SET message = $1, edited = TRUE WHERE id = $2 RETURNING {}",
            MESSAGE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(text)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref()
            .map(message_from_row)
            .ok_or(StoreError::NotFound("message"))
    }

    async fn toggle_reaction(
        &self,
        id: Uuid,
        user_id: &str,
        emoji: &str,
    ) -> StoreResult<ChatMessage> {
        let mut tx = self.pool.begin().await?;

        // Row lock: concurrent toggles on one message apply one after another
        let sql = format!("SELECT {} FROM chat_messages WHERE id = $1 FOR UPDATE", MESSAGE_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *tx).await?;
        let mut message = row
            .as_ref()
            .map(message_from_row)
            .ok_or(StoreError::NotFound("message"))?;

        message.toggle_reaction(user_id, emoji);
        sqlx::query("UPDATE chat_messages SET reactions = $1 WHERE id = $2")
            .bind(Json(&message.reactions))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<ChatMessage> {
        let sql = format!("DELETE FROM chat_messages WHERE id = $1 RETURNING {}", MESSAGE_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref()
            .map(message_from_row)
            .ok_or(StoreError::NotFound("message"))
    }

    async fn reassign_group(&self, from: &str, to: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE chat_messages SET group_name = $1 WHERE group_name = $2")
            .bind(to)
            .bind(from)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_group(&self, group: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE group_name = $1")
            .bind(group)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, instagram_handle, message_count, last_login_at, created_at";

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        instagram_handle: row.get("instagram_handle"),
        message_count: row.get("message_count"),
        sessions: Vec::new(),
        last_login_at: row.get("last_login_at"),
        created_at: row.get("created_at"),
    }
}

/// Users in `users` with login history in `user_sessions`
pub struct PgUsers {
    pool: PgPool,
}

impl PgUsers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        let row = sqlx::query(&sql).bind(value).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => {
                let mut user = user_from_row(&row);
                user.sessions = self.load_sessions(&user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn load_sessions(&self, user_id: &str) -> StoreResult<Vec<SessionEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT at, user_agent, browser, os, device
            FROM user_sessions
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SessionEntry {
                at: row.get("at"),
                user_agent: row.get("user_agent"),
                browser: row.get("browser"),
                os: row.get("os"),
                device: row.get("device"),
            })
            .collect())
    }
}

#[async_trait]
impl UserRepository for PgUsers {
    async fn insert(&self, user: User) -> StoreResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, instagram_handle, message_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.instagram_handle)
        .bind(user.message_count)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let taken = match &e {
                sqlx::Error::Database(db) if db.constraint() == Some("users_email_key") => {
                    &user.email
                }
                _ => &user.username,
            };
            unique_or_db(e, taken)
        })?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.find_one("id", id).await
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_many(&self, ids: &[String]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        let rows = sqlx::query(&sql).bind(ids).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn increment_message_count(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET message_count = message_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    async fn record_session(
        &self,
        id: &str,
        entry: SessionEntry,
        cap: usize,
    ) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE users SET last_login_at = $1 WHERE id = $2")
            .bind(entry.at)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }

        sqlx::query(
            r#"
            INSERT INTO user_sessions (user_id, at, user_agent, browser, os, device)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(entry.at)
        .bind(&entry.user_agent)
        .bind(&entry.browser)
        .bind(&entry.os)
        .bind(&entry.device)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM user_sessions
            WHERE user_id = $1 AND id NOT IN (
                SELECT id FROM user_sessions WHERE user_id = $1 ORDER BY id DESC LIMIT $2
            )
            "#,
        )
        .bind(id)
        .bind(cap as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or(StoreError::NotFound("user"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    #[ignore] // Requires a PostgreSQL database
    async fn test_group_lifecycle() {
        let groups = PgGroups::new(pool().await);
        let name = format!("pg-test-{}", Uuid::new_v4());
        let group = groups
            .insert(ChatGroup::new(name.clone(), "hash".into(), "u1".into()))
            .await
            .unwrap();

        assert_matches!(
            groups
                .insert(ChatGroup::new(name.clone(), "hash".into(), "u2".into()))
                .await,
            Err(StoreError::Duplicate(_))
        );

        groups.add_member(&name, "u2").await.unwrap();
        groups.add_member(&name, "u2").await.unwrap();
        let found = groups.find_by_name(&name).await.unwrap().unwrap();
        assert_eq!(found.members.len(), 2);

        let after = groups.remove_member(group.id, "u2").await.unwrap();
        assert!(!after.is_member("u2"));

        groups.delete(group.id).await.unwrap();
        assert!(groups.find_by_id(group.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore] // Requires a PostgreSQL database
    async fn test_message_reactions_round_trip() {
        let messages = PgMessages::new(pool().await);
        let group = format!("pg-test-{}", Uuid::new_v4());
        let message = messages
            .insert(ChatMessage::new(
                group.clone(),
                "u1".into(),
                "kelly".into(),
                "offshore and clean".into(),
                Utc::now(),
            ))
            .await
            .unwrap();

        let reactions = vec![Reaction {
            emoji: "🤙".into(),
            user_id: "u2".into(),
        }];
        let toggled = messages.toggle_reaction(message.id, "u2", "🤙").await.unwrap();
        assert_eq!(toggled.reactions, reactions);
        let found = messages.find(message.id).await.unwrap().unwrap();
        assert_eq!(found.reactions, reactions);
        let toggled = messages.toggle_reaction(message.id, "u2", "🤙").await.unwrap();
        assert!(toggled.reactions.is_empty());

        assert_eq!(messages.delete_group(&group).await.unwrap(), 1);
    }
}
