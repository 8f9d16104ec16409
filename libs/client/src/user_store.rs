//! Cache of the current user and the friends list
//!
//! Initialized once per application lifetime; `init` on an initialized
//! store is a no-op. Decode failures during `init` are raised as errors
//! rather than defaulted away: a malformed user or friends payload means
//! the deployment is broken, not that the data is optional.

use std::sync::{Mutex, MutexGuard};

use crate::client::ApiClient;
use crate::error::StoreError;
use crate::models::{CurrentUser, FriendRef, UserPatch};

#[derive(Default)]
struct UserState {
    current: Option<CurrentUser>,
    friends: Vec<FriendRef>,
    initialized: bool,
    loading: bool,
    error: Option<String>,
}

/// Cache of exactly one current user plus the friends list
pub struct UserStore {
    client: ApiClient,
    state: Mutex<UserState>,
}

impl UserStore {
    /// Create an uninitialized store backed by the given client
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Mutex::new(UserState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, UserState> {
        self.state.lock().expect("user store mutex poisoned")
    }

    /// The cached current user, if initialized
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state().current.clone()
    }

    /// The cached friends list
    pub fn friends(&self) -> Vec<FriendRef> {
        self.state().friends.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Message of the most recent failure, cleared at the start of every call
    pub fn last_error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Drop all cached state; used for test isolation
    pub fn reset(&self) {
        *self.state() = UserState::default();
    }

    /// Load the named (real) user's full record and the friends list
    ///
    /// A no-op when the store is already initialized.
    pub async fn init(&self, username: &str) -> Result<(), StoreError> {
        if self.state().initialized {
            return Ok(());
        }

        {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
        }

        let result = async {
            let current = self.client.get_user(username).await?;
            let friends = self.client.list_friends().await?;
            Ok::<_, StoreError>((current, friends))
        }
        .await;

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok((current, friends)) => {
                state.current = Some(current);
                state.friends = friends;
                state.initialized = true;
                Ok(())
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Send a partial update for the current user, then re-fetch so local
    /// state matches the store
    pub async fn update_current_user(&self, patch: &UserPatch) -> Result<CurrentUser, StoreError> {
        let username = self
            .state()
            .current
            .as_ref()
            .map(|u| u.username.clone())
            .ok_or(StoreError::NoCurrentUser)?;

        {
            let mut state = self.state();
            state.error = None;
        }

        let result = async {
            self.client.update_user(&username, patch).await?;
            self.client.get_user(&username).await
        }
        .await;

        match result {
            Ok(fresh) => {
                self.state().current = Some(fresh.clone());
                Ok(fresh)
            }
            Err(e) => {
                self.state().error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
