//! Custom error types for the client stores

use thiserror::Error;

/// Error type surfaced by the API client and the stores
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level failure (connection refused, timeout, ...)
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body was not the JSON we expect; a malformed payload
    /// here means a broken deployment, so it is never papered over
    #[error("Malformed response body: {0}")]
    Decode(String),

    /// A user-store operation before `init`
    #[error("No current user is loaded")]
    NoCurrentUser,

    /// An optimistic wrapper was called for an id that is not cached
    #[error("Session {0} is not cached")]
    NotCached(String),
}
