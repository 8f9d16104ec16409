//! REST routes for the tracker API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiJson},
    introspect,
    models::{CreateUserRequest, NewSessionRequest, NewUserRecord, SessionPatch, UserPatch},
    repositories::user::is_unique_violation,
    state::AppState,
};

/// Create the router for the tracker API
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/:username", get(get_user).put(update_user))
        .route("/api/friends", get(list_friends))
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", get(get_session).put(update_session))
        .route("/api/db/tables", get(list_tables))
        .route("/api/db/table/:name", get(dump_table))
        .fallback(not_found)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "bloomtimer-api"
    }))
}

/// Fallback for unmatched routes
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"})))
}

/// List all users' public fields; the password never appears here
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.user_repository.list().await.map_err(|e| {
        error!("Failed to list users: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(json!({ "data": users })))
}

/// Get one user's full record, including the password
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repository
        .find_by_username(&username)
        .await
        .map_err(|e| {
            error!("Failed to get user: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "username": user.username,
        "password": user.password,
        "flowers": user.flowers,
        "focus_time": user.focus_time,
        "config": user.config,
    })))
}

/// Create a user
///
/// Not exercised by the shipped client, which only ever sees seeded
/// users; kept for completeness and for tooling.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.as_deref().unwrap_or("").trim().to_string();
    let password = payload.password.clone().unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let taken = state
        .user_repository
        .exists(&username)
        .await
        .map_err(|e| {
            error!("Failed to check username: {}", e);
            ApiError::Internal
        })?;
    if taken {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let record = NewUserRecord {
        username: username.clone(),
        password,
        flowers: payload.flowers.unwrap_or(0),
        focus_time: payload.focus_time.unwrap_or(25),
        config: payload.config.clone().unwrap_or_default(),
        is_real: false,
    };
    // The exists check above is advisory; a concurrent create can still
    // lose the race, and the UNIQUE constraint reports it here
    state.user_repository.create(&record).await.map_err(|e| {
        if is_unique_violation(&e) {
            return ApiError::Conflict("User already exists".to_string());
        }
        error!("Failed to create user: {}", e);
        ApiError::Internal
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created",
            "user": {
                "username": record.username,
                "flowers": record.flowers,
                "focus_time": record.focus_time,
                "config": record.config,
            }
        })),
    ))
}

/// Apply a partial patch to a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let exists = state
        .user_repository
        .exists(&username)
        .await
        .map_err(|e| {
            error!("Failed to check username: {}", e);
            ApiError::Internal
        })?;
    if !exists {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    if patch.is_empty() {
        return Err(ApiError::BadRequest(
            "No updatable fields provided".to_string(),
        ));
    }

    state
        .user_repository
        .update(&username, &patch)
        .await
        .map_err(|e| {
            error!("Failed to update user: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(json!({"message": "User updated"})))
}

/// List `{id, username}` for all friend users
pub async fn list_friends(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let friends = state.user_repository.list_friends().await.map_err(|e| {
        error!("Failed to list friends: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(json!({ "data": friends })))
}

/// List all sessions with their admin's username
pub async fn list_sessions(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let sessions = state.session_repository.list().await.map_err(|e| {
        error!("Failed to list sessions: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(json!({ "data": sessions })))
}

/// Get one session by id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .session_repository
        .find_by_id(&id)
        .await
        .map_err(|e| {
            error!("Failed to get session: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    Ok(Json(session))
}

/// Create a session owned by the current real user
///
/// A store without a real user is mis-seeded; that is an internal error,
/// not a request error.
pub async fn create_session(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let admin = state
        .user_repository
        .find_real()
        .await
        .map_err(|e| {
            error!("Failed to resolve real user: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| {
            error!("No real user exists; store is mis-seeded");
            ApiError::Internal
        })?;

    let id = state
        .session_repository
        .create(admin.id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to create session: {}", e);
            ApiError::Internal
        })?;

    info!("Session {} created by {}", id, admin.username);
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Apply a partial patch to a session
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<SessionPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let exists = state.session_repository.exists(&id).await.map_err(|e| {
        error!("Failed to check session: {}", e);
        ApiError::Internal
    })?;
    if !exists {
        return Err(ApiError::NotFound("Session not found".to_string()));
    }

    if patch.is_empty() {
        return Err(ApiError::BadRequest(
            "No updatable fields provided".to_string(),
        ));
    }

    state
        .session_repository
        .update(&id, &patch)
        .await
        .map_err(|e| {
            error!("Failed to update session: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(json!({"message": "Session updated"})))
}

/// List the store's table names
pub async fn list_tables(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tables = introspect::table_names(&state.db_pool).await.map_err(|e| {
        error!("Failed to list tables: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(json!({ "tables": tables })))
}

/// Dump a table's raw rows
///
/// The name is validated before it gets anywhere near a query.
pub async fn dump_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !introspect::is_valid_identifier(&name) {
        return Err(ApiError::BadRequest("Invalid table name".to_string()));
    }

    let tables = introspect::table_names(&state.db_pool).await.map_err(|e| {
        error!("Failed to list tables: {}", e);
        ApiError::Internal
    })?;
    if !tables.contains(&name) {
        return Err(ApiError::NotFound("Table not found".to_string()));
    }

    let rows = introspect::dump_table(&state.db_pool, &name)
        .await
        .map_err(|e| {
            error!("Failed to dump table {}: {}", name, e);
            ApiError::Internal
        })?;

    Ok(Json(json!({ "rows": rows })))
}
