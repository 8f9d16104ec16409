//! Custom error types for the API service

use axum::{
    Json, async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the REST surface
///
/// Every variant maps to a fixed HTTP status and a plain message; error
/// bodies are always `{error: <message>}`. Store-level failures are
/// converted at the handler boundary and never escape raw.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or empty patch, invalid identifier
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No row for the given key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate username on create
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store-level failure or broken precondition
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body extractor whose rejection is our error body shape
///
/// The stock `Json` extractor answers malformed or type-invalid bodies
/// with a plain-text 422; every error this API emits is a 400/404/409/500
/// with `{error: <message>}`, so body rejections are folded into
/// [`ApiError::BadRequest`] here.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}
