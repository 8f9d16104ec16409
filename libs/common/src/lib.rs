//! Common library for the Bloomtimer study-session tracker
//!
//! This crate provides shared infrastructure used across the Bloomtimer
//! workspace: SQLite connectivity and pooling, and the database error
//! taxonomy.

pub mod database;
pub mod error;
