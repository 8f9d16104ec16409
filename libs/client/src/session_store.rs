//! In-memory cache of session entities
//!
//! The cache is a reflection of server truth keyed by session id. Fetches
//! replace entries wholesale; creates and updates re-fetch before the
//! local entry is treated as authoritative. The collection wrappers are
//! the one deliberate exception: they overwrite the cached field
//! optimistically for a responsive UI and do not roll back when the
//! write fails, so until the next fetch the cache can be ahead of the
//! server. The failure is still logged, recorded in the error slot and
//! returned to the caller.
//!
//! No ordering guarantee exists across in-flight calls: if two updates to
//! the same id race, whichever response resolves last wins.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::client::ApiClient;
use crate::error::StoreError;
use crate::models::{NewSession, Session, SessionPatch, Todo};

#[derive(Default)]
struct SessionState {
    by_id: HashMap<String, Session>,
    loading: bool,
    error: Option<String>,
}

/// Cache of session entities keyed by id
pub struct SessionStore {
    client: ApiClient,
    state: Mutex<SessionState>,
}

impl SessionStore {
    /// Create an empty store backed by the given client
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session store mutex poisoned")
    }

    /// All cached sessions, newest first
    pub fn sessions(&self) -> Vec<Session> {
        let state = self.state();
        let mut sessions: Vec<Session> = state.by_id.values().cloned().collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sessions
    }

    /// Cached session by id, if present
    pub fn get(&self, id: &str) -> Option<Session> {
        self.state().by_id.get(id).cloned()
    }

    /// True while a fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Message of the most recent failure, cleared at the start of every call
    pub fn last_error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Drop all cached state; used for test isolation
    pub fn reset(&self) {
        *self.state() = SessionState::default();
    }

    fn begin(&self) {
        let mut state = self.state();
        state.loading = true;
        state.error = None;
    }

    fn fail(&self, error: &StoreError) {
        let mut state = self.state();
        state.loading = false;
        state.error = Some(error.to_string());
    }

    /// Replace the whole cache with the server's current session list
    ///
    /// On failure the existing cache is left untouched.
    pub async fn fetch_sessions(&self) -> Result<Vec<Session>, StoreError> {
        self.begin();
        match self.client.list_sessions().await {
            Ok(sessions) => {
                let mut state = self.state();
                state.by_id = sessions
                    .iter()
                    .map(|s| (s.id.clone(), s.clone()))
                    .collect();
                state.loading = false;
                Ok(sessions)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Fetch one session and insert or replace its cache entry
    pub async fn fetch_session(&self, id: &str) -> Result<Session, StoreError> {
        self.begin();
        match self.client.get_session(id).await {
            Ok(session) => {
                let mut state = self.state();
                state.by_id.insert(session.id.clone(), session.clone());
                state.loading = false;
                Ok(session)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Create a session and populate the cache with the server-confirmed
    /// entity before returning the new id
    pub async fn create_session(&self, new: &NewSession) -> Result<String, StoreError> {
        self.begin();
        let id = match self.client.create_session(new).await {
            Ok(id) => id,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };
        // Never synthesize a local-only entry; read back what the server stored
        self.fetch_session(&id).await?;
        Ok(id)
    }

    /// Apply a partial update and reconcile the cache with server truth
    pub async fn update_session(
        &self,
        id: &str,
        patch: &SessionPatch,
    ) -> Result<Session, StoreError> {
        self.begin();
        if let Err(e) = self.client.update_session(id, patch).await {
            self.fail(&e);
            return Err(e);
        }
        self.fetch_session(id).await
    }

    /// Optimistically overwrite the cached invite list, then persist it
    pub async fn update_invited_friend_ids(
        &self,
        id: &str,
        invited_friend_ids: Vec<i64>,
    ) -> Result<(), StoreError> {
        self.apply_optimistic(id, |session| {
            session.invited_friend_ids = invited_friend_ids.clone();
        })?;
        let patch = SessionPatch {
            invited_friend_ids: Some(invited_friend_ids),
            ..Default::default()
        };
        self.persist_optimistic(id, &patch).await
    }

    /// Optimistically overwrite the cached shared to-do list, then persist it
    pub async fn update_todos(&self, id: &str, todos: Vec<Todo>) -> Result<(), StoreError> {
        self.apply_optimistic(id, |session| {
            session.todos = todos.clone();
        })?;
        let patch = SessionPatch {
            todos: Some(todos),
            ..Default::default()
        };
        self.persist_optimistic(id, &patch).await
    }

    /// Optimistically overwrite the cached personal to-do list, then persist it
    pub async fn update_personal_todos(
        &self,
        id: &str,
        personal_todos: Vec<Todo>,
    ) -> Result<(), StoreError> {
        self.apply_optimistic(id, |session| {
            session.personal_todos = personal_todos.clone();
        })?;
        let patch = SessionPatch {
            personal_todos: Some(personal_todos),
            ..Default::default()
        };
        self.persist_optimistic(id, &patch).await
    }

    fn apply_optimistic(
        &self,
        id: &str,
        mutate: impl FnOnce(&mut Session),
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        let session = state
            .by_id
            .get_mut(id)
            .ok_or_else(|| StoreError::NotCached(id.to_string()))?;
        mutate(session);
        Ok(())
    }

    async fn persist_optimistic(&self, id: &str, patch: &SessionPatch) -> Result<(), StoreError> {
        match self.client.update_session(id, patch).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // The optimistic value stays in the cache until the next fetch
                warn!("Failed to persist optimistic update for session {}: {}", id, e);
                self.state().error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
