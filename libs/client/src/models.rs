//! Client-side models
//!
//! Wire field names (`invited_ids`, `focus_time`, ...) are normalized into
//! the client's own names through serde attributes, so consumers of the
//! stores never see the raw wire format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Private,
}

/// Planned length of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Duration {
    pub hours: i64,
    pub minutes: i64,
}

/// A to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub text: String,
    pub done: bool,
}

/// A cached session entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    pub privacy: Privacy,
    pub topic: String,
    pub duration: Duration,
    pub admin_user_id: i64,
    pub admin_username: String,
    pub start_time: i64,
    #[serde(rename = "invited_ids")]
    pub invited_friend_ids: Vec<i64>,
    pub todos: Vec<Todo>,
    pub personal_todos: Vec<Todo>,
}

/// Payload for session creation; absent fields take server defaults
#[derive(Debug, Clone, Serialize, Default)]
pub struct NewSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Privacy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    #[serde(rename = "invited_ids", skip_serializing_if = "Option::is_none")]
    pub invited_friend_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todos: Option<Vec<Todo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_todos: Option<Vec<Todo>>,
}

/// Partial update for a session; absent fields remain unchanged
///
/// `duration`, when present, must be the complete object: the server
/// rewrites both halves together.
#[derive(Debug, Clone, Serialize, Default)]
pub struct SessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Privacy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    #[serde(rename = "invited_ids", skip_serializing_if = "Option::is_none")]
    pub invited_friend_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todos: Option<Vec<Todo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_todos: Option<Vec<Todo>>,
}

/// The current user's full record (this demo ships the password)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentUser {
    pub username: String,
    pub password: String,
    pub flowers: i64,
    pub focus_time: i64,
    pub config: Map<String, Value>,
}

/// Public view of a user from the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub username: String,
    pub flowers: i64,
    pub focus_time: i64,
    pub config: Map<String, Value>,
}

/// A friend usable as a session invitee
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FriendRef {
    pub id: i64,
    pub username: String,
}

/// Partial update for the current user
#[derive(Debug, Clone, Serialize, Default)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flowers: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}
