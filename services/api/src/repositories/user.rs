//! User repository for database operations

use anyhow::Result;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::info;

use crate::models::codec;
use crate::models::{FriendRef, NewUserRecord, User, UserPatch, UserSummary};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all users' public fields, ordered by username
    pub async fn list(&self) -> Result<Vec<UserSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT username, flowers, focus_time, config
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(|row| UserSummary {
                username: row.get("username"),
                flowers: row.get("flowers"),
                focus_time: row.get("focus_time"),
                config: codec::decode_config(row.get::<Option<String>, _>("config").as_deref()),
            })
            .collect();

        Ok(users)
    }

    /// Find a user by username, including the password
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password, flowers, focus_time, config, is_real
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(map_user))
    }

    /// Find the single real user
    ///
    /// Exactly one row is expected to carry `is_real = 1`; a store without
    /// one is mis-seeded and the caller treats `None` as an internal error.
    pub async fn find_real(&self) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password, flowers, focus_time, config, is_real
            FROM users
            WHERE is_real = 1
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(map_user))
    }

    /// List `{id, username}` for all friend (non-real) users, ordered by username
    pub async fn list_friends(&self) -> Result<Vec<FriendRef>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username
            FROM users
            WHERE is_real = 0
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let friends = rows
            .into_iter()
            .map(|row| FriendRef {
                id: row.get("id"),
                username: row.get("username"),
            })
            .collect();

        Ok(friends)
    }

    /// Check whether a username is already taken
    pub async fn exists(&self, username: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Insert a new user row
    pub async fn create(&self, record: &NewUserRecord) -> Result<i64> {
        info!("Creating new user: {}", record.username);

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password, flowers, focus_time, config, is_real)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.username)
        .bind(&record.password)
        .bind(record.flowers)
        .bind(record.focus_time)
        .bind(codec::encode_config(&record.config))
        .bind(record.is_real as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a user row only if the username is not already present
    ///
    /// Returns true when a row was inserted. Existing rows are never
    /// updated, which makes seeding safe to repeat on a warm store.
    pub async fn insert_if_missing(&self, record: &NewUserRecord) -> Result<bool> {
        if self.exists(&record.username).await? {
            return Ok(false);
        }
        self.create(record).await?;
        Ok(true)
    }

    /// Apply a partial patch to a user row
    ///
    /// Only the fields present in the patch are written; the UPDATE is a
    /// single statement, so the write is atomic per request. Callers check
    /// existence and non-emptiness beforehand.
    pub async fn update(&self, username: &str, patch: &UserPatch) -> Result<()> {
        let mut sets: Vec<&str> = Vec::new();
        let mut binds: Vec<Bind> = Vec::new();

        if let Some(password) = &patch.password {
            sets.push("password = ?");
            binds.push(Bind::Text(password.clone()));
        }
        if let Some(flowers) = patch.flowers {
            sets.push("flowers = ?");
            binds.push(Bind::Int(flowers));
        }
        if let Some(focus_time) = patch.focus_time {
            sets.push("focus_time = ?");
            binds.push(Bind::Int(focus_time));
        }
        if let Some(config) = &patch.config {
            sets.push("config = ?");
            binds.push(Bind::Text(codec::encode_config(config)));
        }

        let sql = format!("UPDATE users SET {} WHERE username = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = match bind {
                Bind::Int(v) => query.bind(v),
                Bind::Text(v) => query.bind(v),
            };
        }
        query.bind(username).execute(&self.pool).await?;

        Ok(())
    }
}

/// Check whether a repository error is a UNIQUE constraint violation
///
/// Lets callers that raced past an existence check tell a duplicate key
/// apart from a genuine store failure.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}

/// Bind value for dynamically assembled statements
enum Bind {
    Int(i64),
    Text(String),
}

fn map_user(row: SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password: row.get("password"),
        flowers: row.get("flowers"),
        focus_time: row.get("focus_time"),
        config: codec::decode_config(row.get::<Option<String>, _>("config").as_deref()),
        is_real: row.get::<i64, _>("is_real") != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use common::database::{DatabaseConfig, init_pool};

    async fn repo() -> UserRepository {
        let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
        schema::init(&pool).await.unwrap();
        UserRepository::new(pool)
    }

    #[tokio::test]
    async fn insert_if_missing_never_overwrites() {
        let repo = repo().await;
        let first = NewUserRecord::with_defaults("alice", "first", false);
        let second = NewUserRecord::with_defaults("alice", "second", false);

        assert!(repo.insert_if_missing(&first).await.unwrap());
        assert!(!repo.insert_if_missing(&second).await.unwrap());

        let user = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.password, "first");
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn partial_update_leaves_other_fields_untouched() {
        let repo = repo().await;
        repo.create(&NewUserRecord::with_defaults("alice", "pw", true))
            .await
            .unwrap();

        let patch = UserPatch {
            flowers: Some(7),
            ..Default::default()
        };
        repo.update("alice", &patch).await.unwrap();

        let user = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.flowers, 7);
        assert_eq!(user.password, "pw");
        assert_eq!(user.focus_time, 25);
        assert_eq!(
            user.config.get("defaultStudyMinutes"),
            Some(&serde_json::Value::from(25))
        );
    }

    #[tokio::test]
    async fn friends_exclude_the_real_user_and_sort_by_username() {
        let repo = repo().await;
        repo.create(&NewUserRecord::with_defaults("zoe", "pw", false))
            .await
            .unwrap();
        repo.create(&NewUserRecord::with_defaults("admin", "pw", true))
            .await
            .unwrap();
        repo.create(&NewUserRecord::with_defaults("bob", "pw", false))
            .await
            .unwrap();

        let friends = repo.list_friends().await.unwrap();
        let names: Vec<&str> = friends.iter().map(|f| f.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "zoe"]);

        let real = repo.find_real().await.unwrap().unwrap();
        assert_eq!(real.username, "admin");
    }

    #[tokio::test]
    async fn duplicate_insert_surfaces_as_unique_violation() {
        let repo = repo().await;
        repo.create(&NewUserRecord::with_defaults("alice", "pw", false))
            .await
            .unwrap();

        let err = repo
            .create(&NewUserRecord::with_defaults("alice", "other", false))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));

        let other = repo
            .update("alice", &UserPatch::default())
            .await
            .unwrap_err();
        assert!(!is_unique_violation(&other));
    }

    #[tokio::test]
    async fn malformed_config_column_degrades_to_empty_object() {
        let repo = repo().await;
        repo.create(&NewUserRecord::with_defaults("alice", "pw", false))
            .await
            .unwrap();
        sqlx::query("UPDATE users SET config = 'not json' WHERE username = 'alice'")
            .execute(&repo.pool)
            .await
            .unwrap();

        let user = repo.find_by_username("alice").await.unwrap().unwrap();
        assert!(user.config.is_empty());
    }
}
