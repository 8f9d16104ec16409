//! Client-side store layer for the Bloomtimer tracker
//!
//! The stores are in-memory caches of server state, not sources of truth:
//! every mutation either re-fetches the affected entity or applies a
//! server-confirmed write before local state is treated as authoritative.
//! Each store is an explicit object owned by the application's composition
//! root and carries a `reset()` for test isolation.

pub mod client;
pub mod error;
pub mod models;
pub mod session_store;
pub mod user_store;

pub use client::ApiClient;
pub use error::StoreError;
pub use session_store::SessionStore;
pub use user_store::UserStore;
