//! Application state shared across handlers

use sqlx::SqlitePool;

use crate::repositories::{SessionRepository, UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub user_repository: UserRepository,
    pub session_repository: SessionRepository,
}

impl AppState {
    /// Build the state and its repositories from a pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user_repository: UserRepository::new(pool.clone()),
            session_repository: SessionRepository::new(pool.clone()),
            db_pool: pool,
        }
    }
}
