//! Integration tests for the client stores against a live server
//!
//! Each test spins up the real router on an ephemeral port with an
//! in-memory store seeded with the default users.

use sqlx::SqlitePool;
use std::path::Path;
use tokio::task::JoinHandle;

use api::{routes::create_router, schema, seed, state::AppState};
use client::models::{NewSession, SessionPatch, Todo, UserPatch};
use client::{ApiClient, SessionStore, StoreError, UserStore};
use common::database::{DatabaseConfig, init_pool};

async fn spawn_server() -> (String, SqlitePool, JoinHandle<()>) {
    let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
    schema::init(&pool).await.unwrap();
    let state = AppState::new(pool.clone());
    seed::seed(&state.user_repository, Path::new("no-such-seed-file.txt"))
        .await
        .unwrap();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), pool, handle)
}

#[tokio::test]
async fn user_store_initializes_once_and_resyncs_after_update() {
    let (base_url, _pool, server) = spawn_server().await;
    let store = UserStore::new(ApiClient::new(&base_url));

    store.init("admin").await.unwrap();
    assert!(store.is_initialized());
    let current = store.current_user().unwrap();
    assert_eq!(current.username, "admin");
    assert_eq!(current.flowers, 0);
    assert_eq!(store.friends().len(), 4);

    // Second init is a no-op
    store.init("paolo").await.unwrap();
    assert_eq!(store.current_user().unwrap().username, "admin");

    let patch = UserPatch {
        flowers: Some(3),
        ..Default::default()
    };
    let fresh = store.update_current_user(&patch).await.unwrap();
    assert_eq!(fresh.flowers, 3);
    assert_eq!(fresh.password, "12345");
    assert_eq!(store.current_user().unwrap().flowers, 3);

    server.abort();
}

#[tokio::test]
async fn user_store_requires_init_before_updates() {
    let (base_url, _pool, server) = spawn_server().await;
    let store = UserStore::new(ApiClient::new(&base_url));

    let result = store.update_current_user(&UserPatch::default()).await;
    assert!(matches!(result, Err(StoreError::NoCurrentUser)));

    server.abort();
}

#[tokio::test]
async fn session_store_caches_server_confirmed_entities() {
    let (base_url, _pool, server) = spawn_server().await;
    let store = SessionStore::new(ApiClient::new(&base_url));

    let new = NewSession {
        topic: Some("rust".to_string()),
        invited_friend_ids: Some(vec![2, 3]),
        ..Default::default()
    };
    let id = store.create_session(&new).await.unwrap();

    // Cache holds what the server stored, not a synthesized local entry
    let cached = store.get(&id).unwrap();
    assert_eq!(cached.topic, "rust");
    assert_eq!(cached.invited_friend_ids, vec![2, 3]);
    assert_eq!(cached.admin_username, "admin");
    assert!(cached.start_time > 0);

    let patch = SessionPatch {
        topic: Some("sqlx".to_string()),
        ..Default::default()
    };
    let refreshed = store.update_session(&id, &patch).await.unwrap();
    assert_eq!(refreshed.topic, "sqlx");
    assert_eq!(refreshed.invited_friend_ids, vec![2, 3]);
    assert_eq!(store.get(&id).unwrap().topic, "sqlx");

    let listed = store.fetch_sessions().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(store.sessions().len(), 1);
    assert!(!store.is_loading());
    assert!(store.last_error().is_none());

    server.abort();
}

#[tokio::test]
async fn optimistic_todo_update_is_confirmed_by_the_server() {
    let (base_url, _pool, server) = spawn_server().await;
    let store = SessionStore::new(ApiClient::new(&base_url));

    let id = store.create_session(&NewSession::default()).await.unwrap();
    let todos = vec![Todo {
        text: "a".to_string(),
        done: false,
    }];
    store.update_todos(&id, todos.clone()).await.unwrap();

    // Locally visible right away
    assert_eq!(store.get(&id).unwrap().todos, todos);

    // And confirmed on a fresh read-through
    let fresh = store.fetch_session(&id).await.unwrap();
    assert_eq!(fresh.todos, todos);

    server.abort();
}

#[tokio::test]
async fn failed_fetch_leaves_existing_cache_intact() {
    let (base_url, pool, server) = spawn_server().await;
    let store = SessionStore::new(ApiClient::new(&base_url));

    let id = store.create_session(&NewSession::default()).await.unwrap();
    assert_eq!(store.sessions().len(), 1);

    // Break the store behind the server's back so the next list is a 500
    sqlx::query("DROP TABLE sessions").execute(&pool).await.unwrap();

    let result = store.fetch_sessions().await;
    assert!(matches!(result, Err(StoreError::Api { status: 500, .. })));
    assert_eq!(store.sessions().len(), 1, "cache was clobbered on failure");
    assert!(store.get(&id).is_some());
    assert!(store.last_error().is_some());
    assert!(!store.is_loading());

    server.abort();
}

#[tokio::test]
async fn failed_optimistic_update_keeps_the_optimistic_value() {
    let (base_url, pool, server) = spawn_server().await;
    let store = SessionStore::new(ApiClient::new(&base_url));

    let id = store.create_session(&NewSession::default()).await.unwrap();

    // Remove the row server-side so the write comes back 404
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(&id)
        .execute(&pool)
        .await
        .unwrap();

    let invited = vec![2, 3];
    let result = store.update_invited_friend_ids(&id, invited.clone()).await;
    assert!(matches!(result, Err(StoreError::Api { status: 404, .. })));

    // No rollback: the unconfirmed value stays visible
    assert_eq!(store.get(&id).unwrap().invited_friend_ids, invited);
    assert!(store.last_error().is_some());

    server.abort();
}

#[tokio::test]
async fn optimistic_wrappers_require_a_cached_entry() {
    let (base_url, _pool, server) = spawn_server().await;
    let store = SessionStore::new(ApiClient::new(&base_url));

    let result = store.update_todos("not-cached", Vec::new()).await;
    assert!(matches!(result, Err(StoreError::NotCached(_))));

    server.abort();
}

#[tokio::test]
async fn reset_clears_all_cached_state() {
    let (base_url, _pool, server) = spawn_server().await;
    let client = ApiClient::new(&base_url);

    let sessions = SessionStore::new(client.clone());
    sessions.create_session(&NewSession::default()).await.unwrap();
    assert_eq!(sessions.sessions().len(), 1);
    sessions.reset();
    assert!(sessions.sessions().is_empty());

    let users = UserStore::new(client);
    users.init("admin").await.unwrap();
    users.reset();
    assert!(!users.is_initialized());
    assert!(users.current_user().is_none());

    server.abort();
}
