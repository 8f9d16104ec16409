//! Bloomtimer API service
//!
//! REST server for the study-session tracker: users and sessions over an
//! SQLite store, plus startup seeding and raw table introspection. The
//! binary in `main.rs` wires this together; the library form exists so
//! the router can be driven directly from integration tests.

pub mod config;
pub mod error;
pub mod introspect;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod schema;
pub mod seed;
pub mod state;
