//! Schema creation for the tracker tables

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Create the `users` and `sessions` tables if they do not exist
///
/// Safe to run on every process start. Uniqueness of usernames and the
/// session-to-admin foreign key live here, in the store itself.
pub async fn init(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            flowers INTEGER NOT NULL DEFAULT 0,
            focus_time INTEGER NOT NULL DEFAULT 25,
            config TEXT,
            is_real INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            privacy TEXT NOT NULL DEFAULT 'public',
            topic TEXT NOT NULL DEFAULT '',
            duration_hours INTEGER NOT NULL DEFAULT 0,
            duration_minutes INTEGER NOT NULL DEFAULT 0,
            admin_user_id INTEGER NOT NULL REFERENCES users(id),
            start_time INTEGER NOT NULL,
            invited_ids TEXT,
            todos TEXT,
            personal_todos TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
