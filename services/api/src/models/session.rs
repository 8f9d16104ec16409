//! Session model and related payloads

use serde::{Deserialize, Serialize};

/// Session visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Private,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
        }
    }

    /// Parse the storage form; anything unrecognized falls back to public
    pub fn parse(s: &str) -> Self {
        match s {
            "private" => Privacy::Private,
            _ => Privacy::Public,
        }
    }
}

/// Planned length of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Duration {
    pub hours: i64,
    pub minutes: i64,
}

/// Duration as submitted by clients
///
/// Both halves are rewritten together whenever a duration is present in a
/// patch: an omitted half is stored as 0, not kept. Clients must therefore
/// always submit the complete object.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct DurationPatch {
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
}

impl DurationPatch {
    pub fn resolve(&self) -> Duration {
        Duration {
            hours: self.hours.unwrap_or(0),
            minutes: self.minutes.unwrap_or(0),
        }
    }
}

/// A to-do entry on a session's shared or personal list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub text: String,
    pub done: bool,
}

/// Session entity, as returned by the list and get endpoints
///
/// `admin_username` is joined in from the owning user; the three
/// collections are decoded from their JSON text columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    pub privacy: Privacy,
    pub topic: String,
    pub duration: Duration,
    pub admin_user_id: i64,
    pub admin_username: String,
    pub start_time: i64,
    pub invited_ids: Vec<i64>,
    pub todos: Vec<Todo>,
    pub personal_todos: Vec<Todo>,
}

/// Request body for session creation; every field is optional
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NewSessionRequest {
    pub privacy: Option<Privacy>,
    pub topic: Option<String>,
    pub duration: Option<DurationPatch>,
    #[serde(alias = "invitedFriendIds")]
    pub invited_ids: Option<Vec<i64>>,
    pub todos: Option<Vec<Todo>>,
    #[serde(alias = "personalTodos")]
    pub personal_todos: Option<Vec<Todo>>,
}

/// Partial update payload for a session
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionPatch {
    pub privacy: Option<Privacy>,
    pub topic: Option<String>,
    pub duration: Option<DurationPatch>,
    #[serde(alias = "invitedFriendIds")]
    pub invited_ids: Option<Vec<i64>>,
    pub todos: Option<Vec<Todo>>,
    #[serde(alias = "personalTodos")]
    pub personal_todos: Option<Vec<Todo>>,
}

impl SessionPatch {
    /// True when the patch names none of the updatable fields
    pub fn is_empty(&self) -> bool {
        self.privacy.is_none()
            && self.topic.is_none()
            && self.duration.is_none()
            && self.invited_ids.is_none()
            && self.todos.is_none()
            && self.personal_todos.is_none()
    }
}
