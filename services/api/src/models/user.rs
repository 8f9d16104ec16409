//! User model and related payloads

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

/// User entity as stored in the `users` table
///
/// Exactly one row is expected to carry `is_real = true`; all other rows
/// are "friend" records usable only as session invitees. Passwords are
/// kept in clear text on purpose, this is a classroom demo and not a
/// security boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub flowers: i64,
    pub focus_time: i64,
    pub config: Map<String, Value>,
    pub is_real: bool,
}

/// Public view of a user, as returned by the list endpoint (no password)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub username: String,
    pub flowers: i64,
    pub focus_time: i64,
    pub config: Map<String, Value>,
}

/// Minimal reference to a friend user, used for invite pickers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FriendRef {
    pub id: i64,
    pub username: String,
}

/// Full user record for insertion, used by seeding and the create endpoint
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub password: String,
    pub flowers: i64,
    pub focus_time: i64,
    pub config: Map<String, Value>,
    pub is_real: bool,
}

impl NewUserRecord {
    /// A record with the stock defaults: no flowers, 25 minute focus time
    pub fn with_defaults(username: &str, password: &str, is_real: bool) -> Self {
        let mut config = Map::new();
        config.insert("defaultStudyMinutes".to_string(), Value::from(25));
        Self {
            username: username.to_string(),
            password: password.to_string(),
            flowers: 0,
            focus_time: 25,
            config,
            is_real,
        }
    }
}

/// Request body for user creation
///
/// Fields are optional so that a missing username or password surfaces as
/// a 400 with a descriptive message rather than a deserialization error.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub flowers: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub focus_time: Option<i64>,
    pub config: Option<Map<String, Value>>,
}

/// Partial update payload for a user
///
/// Absent fields are left untouched; numeric fields accept JSON numbers
/// or numeric strings, mirroring the coercion clients have historically
/// relied on.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UserPatch {
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub flowers: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub focus_time: Option<i64>,
    pub config: Option<Map<String, Value>>,
}

impl UserPatch {
    /// True when the patch names none of the updatable fields
    pub fn is_empty(&self) -> bool {
        self.password.is_none()
            && self.flowers.is_none()
            && self.focus_time.is_none()
            && self.config.is_none()
    }
}

/// Deserialize an optional integer from a number or a numeric string
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| de::Error::custom("number out of range")),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid number: {}", s)))
        }
        Some(other) => Err(de::Error::custom(format!(
            "expected a number, got {}",
            other
        ))),
    }
}

/// Deserialize an optional string, stringifying scalars
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string, got {}",
            other
        ))),
    }
}
