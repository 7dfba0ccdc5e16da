// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use std::sync::Arc;
use talent_onboarding::config::Config;
use talent_onboarding::db::{FirestoreDb, MemoryStore, ProfileStore};
use talent_onboarding::routes::create_router;
use talent_onboarding::services::{create_dev_session_token, DevSessionVerifier};
use talent_onboarding::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new(&Config::test_default())
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

fn build_app(store: Arc<dyn ProfileStore>) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let verifier = Arc::new(DevSessionVerifier::new(config.dev_session_key.clone()));
    let state = Arc::new(AppState::with_dependencies(config, store, verifier));
    (create_router(state.clone()), state)
}

/// Create a test app backed by an in-memory store.
/// Returns the router and the store so tests can inspect documents.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, MemoryStore) {
    let store = MemoryStore::new();
    let (app, _) = build_app(Arc::new(store.clone()));
    (app, store)
}

/// Create a test app whose store is unreachable.
#[allow(dead_code)]
pub fn create_offline_app() -> axum::Router {
    build_app(Arc::new(test_db_offline())).0
}

/// `Cookie` header value carrying a valid session for `uid`.
#[allow(dead_code)]
pub fn session_cookie(uid: &str) -> String {
    let key = Config::test_default().dev_session_key;
    let token = create_dev_session_token(uid, Some("test@example.com"), &key).unwrap();
    format!("__session={token}")
}

/// GET request, optionally with a cookie header.
#[allow(dead_code)]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// POST request with a JSON body.
#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `Location` header of a redirect response.
#[allow(dead_code)]
pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
