//! Raw table introspection
//!
//! Debug surface over the store: table names and raw row dumps. Table
//! names arrive from the URL, so they are checked against a strict
//! identifier pattern and the known table list before any interpolation
//! into SQL.

use anyhow::Result;
use regex::Regex;
use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool};
use std::sync::OnceLock;

/// True when `name` is a plain SQL identifier
pub fn is_valid_identifier(name: &str) -> bool {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    let regex = IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));
    regex.is_match(name)
}

/// List the user-facing table names in the store
pub async fn table_names(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        SELECT name FROM sqlite_master
        WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("name")).collect())
}

/// Dump every row of a table as JSON objects
///
/// The caller must have validated `name` with [`is_valid_identifier`] and
/// checked it against [`table_names`]; the quoting here is a second line
/// of defense, not the first.
pub async fn dump_table(pool: &SqlitePool, name: &str) -> Result<Vec<Value>> {
    let sql = format!("SELECT * FROM \"{}\"", name);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    Ok(rows.iter().map(row_to_json).collect())
}

/// Convert an untyped row into a JSON object, column by column
fn row_to_json(row: &SqliteRow) -> Value {
    let mut object = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
            v.and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(index) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
            v.map(|bytes| Value::from(String::from_utf8_lossy(&bytes).into_owned()))
                .unwrap_or(Value::Null)
        } else {
            Value::Null
        };
        object.insert(column.name().to_string(), value);
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use common::database::{DatabaseConfig, init_pool};

    #[test]
    fn identifier_validation_rejects_injection_attempts() {
        assert!(is_valid_identifier("users"));
        assert!(is_valid_identifier("_sessions2"));
        assert!(!is_valid_identifier("users; DROP TABLE users;"));
        assert!(!is_valid_identifier("users--"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2users"));
        assert!(!is_valid_identifier("users\""));
    }

    #[tokio::test]
    async fn lists_tracker_tables_and_dumps_rows() {
        let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
        schema::init(&pool).await.unwrap();

        let names = table_names(&pool).await.unwrap();
        assert!(names.contains(&"users".to_string()));
        assert!(names.contains(&"sessions".to_string()));

        sqlx::query("INSERT INTO users (username, password) VALUES ('alice', 'pw')")
            .execute(&pool)
            .await
            .unwrap();

        let rows = dump_table(&pool, "users").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["username"], "alice");
        assert_eq!(rows[0]["flowers"], 0);
        assert_eq!(rows[0]["config"], Value::Null);
    }
}
