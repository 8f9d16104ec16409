//! Session repository for database operations

use anyhow::Result;
use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::info;
use uuid::Uuid;

use crate::models::codec;
use crate::models::{Duration, NewSessionRequest, Privacy, Session, SessionPatch};

/// Session repository
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all sessions joined with the admin's username, newest first
    pub async fn list(&self) -> Result<Vec<Session>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.privacy, s.topic, s.duration_hours, s.duration_minutes,
                   s.admin_user_id, u.username AS admin_username, s.start_time,
                   s.invited_ids, s.todos, s.personal_todos
            FROM sessions s
            JOIN users u ON u.id = s.admin_user_id
            ORDER BY s.start_time DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_session).collect()
    }

    /// Find a session by id, joined with the admin's username
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT s.id, s.privacy, s.topic, s.duration_hours, s.duration_minutes,
                   s.admin_user_id, u.username AS admin_username, s.start_time,
                   s.invited_ids, s.todos, s.personal_todos
            FROM sessions s
            JOIN users u ON u.id = s.admin_user_id
            WHERE s.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_session).transpose()
    }

    /// Check whether a session id is present
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Persist a new session owned by the given admin user
    ///
    /// Generates a fresh v4 UUID as the id and stamps the start time at the
    /// creation instant (epoch milliseconds). Returns the new id; callers
    /// re-fetch for the full object.
    pub async fn create(&self, admin_user_id: i64, new: &NewSessionRequest) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let start_time = Utc::now().timestamp_millis();
        let privacy = new.privacy.unwrap_or_default();
        let duration = new.duration.map(|d| d.resolve()).unwrap_or_default();

        info!("Creating session {} for admin {}", id, admin_user_id);

        sqlx::query(
            r#"
            INSERT INTO sessions (id, privacy, topic, duration_hours, duration_minutes,
                                  admin_user_id, start_time, invited_ids, todos, personal_todos)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(privacy.as_str())
        .bind(new.topic.as_deref().unwrap_or(""))
        .bind(duration.hours)
        .bind(duration.minutes)
        .bind(admin_user_id)
        .bind(start_time)
        .bind(codec::encode_list(new.invited_ids.as_deref().unwrap_or(&[]))?)
        .bind(codec::encode_list(new.todos.as_deref().unwrap_or(&[]))?)
        .bind(codec::encode_list(new.personal_todos.as_deref().unwrap_or(&[]))?)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Apply a partial patch to a session row
    ///
    /// A present `duration` rewrites both halves, reading an omitted half
    /// as 0. Single UPDATE statement, so the write is atomic per request.
    pub async fn update(&self, id: &str, patch: &SessionPatch) -> Result<()> {
        let mut sets: Vec<&str> = Vec::new();
        let mut binds: Vec<Bind> = Vec::new();

        if let Some(privacy) = patch.privacy {
            sets.push("privacy = ?");
            binds.push(Bind::Text(privacy.as_str().to_string()));
        }
        if let Some(topic) = &patch.topic {
            sets.push("topic = ?");
            binds.push(Bind::Text(topic.clone()));
        }
        if let Some(duration) = patch.duration {
            let duration = duration.resolve();
            sets.push("duration_hours = ?");
            binds.push(Bind::Int(duration.hours));
            sets.push("duration_minutes = ?");
            binds.push(Bind::Int(duration.minutes));
        }
        if let Some(invited_ids) = &patch.invited_ids {
            sets.push("invited_ids = ?");
            binds.push(Bind::Text(codec::encode_list(invited_ids)?));
        }
        if let Some(todos) = &patch.todos {
            sets.push("todos = ?");
            binds.push(Bind::Text(codec::encode_list(todos)?));
        }
        if let Some(personal_todos) = &patch.personal_todos {
            sets.push("personal_todos = ?");
            binds.push(Bind::Text(codec::encode_list(personal_todos)?));
        }

        let sql = format!("UPDATE sessions SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = match bind {
                Bind::Int(v) => query.bind(v),
                Bind::Text(v) => query.bind(v),
            };
        }
        query.bind(id).execute(&self.pool).await?;

        Ok(())
    }
}

/// Bind value for dynamically assembled statements
enum Bind {
    Int(i64),
    Text(String),
}

fn map_session(row: SqliteRow) -> Result<Session> {
    Ok(Session {
        id: row.get("id"),
        privacy: Privacy::parse(row.get("privacy")),
        topic: row.get("topic"),
        duration: Duration {
            hours: row.get("duration_hours"),
            minutes: row.get("duration_minutes"),
        },
        admin_user_id: row.get("admin_user_id"),
        admin_username: row.get("admin_username"),
        start_time: row.get("start_time"),
        invited_ids: codec::decode_list(
            row.get::<Option<String>, _>("invited_ids").as_deref(),
            "invited_ids",
        )?,
        todos: codec::decode_list(row.get::<Option<String>, _>("todos").as_deref(), "todos")?,
        personal_todos: codec::decode_list(
            row.get::<Option<String>, _>("personal_todos").as_deref(),
            "personal_todos",
        )?,
    })
}
