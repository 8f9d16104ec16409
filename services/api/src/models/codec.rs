//! Adapter between JSON text columns and typed values
//!
//! The `config`, `invited_ids`, `todos` and `personal_todos` columns hold
//! serialized JSON. Conversion happens here and nowhere else, so the rest
//! of the crate only ever sees native structured values.
//!
//! Decode rules differ by column kind:
//! - `config` is optional data: NULL or malformed text degrades to `{}`.
//! - the list columns are only ever written by [`encode_list`], so NULL
//!   decodes to an empty list but malformed text is reported as an error.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

/// Decode a `config` column into a key/value map
pub fn decode_config(raw: Option<&str>) -> Map<String, Value> {
    let Some(text) = raw else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            warn!("Malformed config column, treating as empty object");
            Map::new()
        }
    }
}

/// Serialize a `config` map for storage
pub fn encode_config(config: &Map<String, Value>) -> String {
    Value::Object(config.clone()).to_string()
}

/// Decode a JSON list column, treating NULL as the empty list
pub fn decode_list<T: DeserializeOwned>(raw: Option<&str>, column: &str) -> Result<Vec<T>> {
    match raw {
        None => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text)
            .with_context(|| format!("Corrupt JSON in column {}", column)),
    }
}

/// Serialize a list for storage in a JSON text column
pub fn encode_list<T: Serialize>(items: &[T]) -> Result<String> {
    serde_json::to_string(items).context("Failed to serialize list column")
}
