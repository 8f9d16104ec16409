//! Data models for the tracker API
//!
//! Entities are fully typed; the JSON text columns backing `config`,
//! `invited_ids`, `todos` and `personal_todos` are converted through the
//! [`codec`] module at the storage boundary only.

pub mod codec;
pub mod session;
pub mod user;

pub use session::{
    Duration, DurationPatch, NewSessionRequest, Privacy, Session, SessionPatch, Todo,
};
pub use user::{CreateUserRequest, FriendRef, NewUserRecord, User, UserPatch, UserSummary};
