//! Startup seeding of the users table
//!
//! On every start the server reads an optional plain-text record source
//! and inserts any missing users. When the file is absent, empty, or
//! yields no valid records, a fixed built-in set is used instead. All
//! writes go through insert-if-missing, so restarts against a warm store
//! are no-ops.

use anyhow::Result;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::models::NewUserRecord;
use crate::repositories::UserRepository;

/// A username/password pair parsed from the seed source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRecord {
    pub username: String,
    pub password: String,
}

/// The built-in fallback set: one real user followed by the friends
const DEFAULT_SEED: &[(&str, &str)] = &[
    ("admin", "12345"),
    ("paolo", "54321"),
    ("luca", "11111"),
    ("giulia", "22222"),
    ("mario", "33333"),
];

/// Parse seed records out of free-form text
///
/// Entries are separated by commas or newlines; within an entry a
/// `username<sep>value` and a `pass[word]<sep>value` pair are looked up
/// with `:` or `=` as separator, case-insensitively and tolerant of
/// surrounding prose. Entries missing either field are skipped.
pub fn parse_seed_records(text: &str) -> Vec<SeedRecord> {
    static SPLIT: OnceLock<Regex> = OnceLock::new();
    static USERNAME: OnceLock<Regex> = OnceLock::new();
    static PASSWORD: OnceLock<Regex> = OnceLock::new();

    let split = SPLIT.get_or_init(|| Regex::new(r"[,\r\n]+").expect("split regex"));
    let username = USERNAME
        .get_or_init(|| Regex::new(r"(?i)\busername\w*\s*[:=]\s*(\w+)").expect("username regex"));
    let password = PASSWORD.get_or_init(|| {
        Regex::new(r"(?i)\bpass(?:word)?\w*\s*[:=]\s*(\w+)").expect("password regex")
    });

    let mut records = Vec::new();
    for entry in split.split(text) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let user_match = username.captures(entry);
        let pass_match = password.captures(entry);
        if let (Some(u), Some(p)) = (user_match, pass_match) {
            records.push(SeedRecord {
                username: u[1].to_string(),
                password: p[1].to_string(),
            });
        }
    }
    records
}

/// Populate the users table from the seed file or the built-in defaults
///
/// The first record of whichever list is used becomes the real user; the
/// rest are friends.
pub async fn seed(users: &UserRepository, seed_file: &Path) -> Result<()> {
    let from_file = match std::fs::read_to_string(seed_file) {
        Ok(text) => parse_seed_records(&text),
        Err(_) => {
            // A missing seed file is expected on most deployments
            Vec::new()
        }
    };

    if from_file.is_empty() {
        let mut inserted = 0;
        for (index, (username, password)) in DEFAULT_SEED.iter().enumerate() {
            let record = NewUserRecord::with_defaults(username, password, index == 0);
            if users.insert_if_missing(&record).await? {
                inserted += 1;
            }
        }
        info!("Seeded {} default user(s)", inserted);
    } else {
        let count = from_file.len();
        let mut inserted = 0;
        for (index, record) in from_file.iter().enumerate() {
            let record =
                NewUserRecord::with_defaults(&record.username, &record.password, index == 0);
            if users.insert_if_missing(&record).await? {
                inserted += 1;
            }
        }
        info!(
            "Loaded {} user(s) from {} ({} new)",
            count,
            seed_file.display(),
            inserted
        );
    }

    if users.find_real().await?.is_none() {
        warn!("No real user present after seeding");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use common::database::{DatabaseConfig, init_pool};

    fn record(username: &str, password: &str) -> SeedRecord {
        SeedRecord {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn parses_comma_and_newline_delimited_entries() {
        let text = "username: alice password: pw1, username=bob password=pw2\nusername: carol pass: pw3";
        assert_eq!(
            parse_seed_records(text),
            vec![
                record("alice", "pw1"),
                record("bob", "pw2"),
                record("carol", "pw3")
            ]
        );
    }

    #[test]
    fn a_comma_between_the_fields_breaks_the_record() {
        // Both fields must sit inside one delimiter-free entry
        let text = "username: alice, password: pw1";
        assert!(parse_seed_records(text).is_empty());
    }

    #[test]
    fn tolerates_surrounding_prose_and_case() {
        let text = "Here is my USERNAME: carol and her Password = secret99";
        assert_eq!(parse_seed_records(text), vec![record("carol", "secret99")]);
    }

    #[test]
    fn accepts_pass_abbreviation_and_suffixed_keys() {
        let text = "username1: dave pass1: hunter2";
        assert_eq!(parse_seed_records(text), vec![record("dave", "hunter2")]);
    }

    #[test]
    fn skips_entries_missing_either_field() {
        let text = "username: eve\npassword: lonely\nusername: frank password: ok";
        assert_eq!(parse_seed_records(text), vec![record("frank", "ok")]);
    }

    #[test]
    fn empty_and_garbage_input_yield_nothing() {
        assert!(parse_seed_records("").is_empty());
        assert!(parse_seed_records(",,,\n\n").is_empty());
        assert!(parse_seed_records("just some text without records").is_empty());
    }

    #[tokio::test]
    async fn missing_file_seeds_the_default_set_idempotently() {
        let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
        schema::init(&pool).await.unwrap();
        let users = UserRepository::new(pool);

        let path = Path::new("no-such-seed-file.txt");
        seed(&users, path).await.unwrap();
        seed(&users, path).await.unwrap();

        let all = users.list().await.unwrap();
        assert_eq!(all.len(), DEFAULT_SEED.len());

        let real = users.find_real().await.unwrap().unwrap();
        assert_eq!(real.username, "admin");
        assert_eq!(real.password, "12345");
        assert_eq!(users.list_friends().await.unwrap().len(), 4);
    }
}
