// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use chirpy::config::Config;
use chirpy::db::{FirestoreStore, MemoryStore};
use chirpy::routes::create_router;
use chirpy::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

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

/// Create a Firestore store against the emulator.
#[allow(dead_code)]
pub async fn test_firestore() -> FirestoreStore {
    FirestoreStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app with the given config over a fresh in-memory store.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(config, store));
    (create_router(state.clone()), state)
}

/// Create a test app with in-memory dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

/// Build a request with an optional JSON body and bearer token.
#[allow(dead_code)]
pub fn request(method: Method, uri: &str, body: Option<Value>, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send one request through a clone of the router.
#[allow(dead_code)]
pub async fn send(app: &axum::Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as text.
#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Register a user and assert success.
#[allow(dead_code)]
pub async fn register(app: &axum::Router, email: &str, password: &str) -> Value {
    let response = send(
        app,
        request(
            Method::POST,
            "/api/users",
            Some(serde_json::json!({ "email": email, "password": password })),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Log in and return the full response body.
#[allow(dead_code)]
pub async fn login(app: &axum::Router, email: &str, password: &str) -> Value {
    let response = send(
        app,
        request(
            Method::POST,
            "/api/login",
            Some(serde_json::json!({ "email": email, "password": password })),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Register and log in; returns `(access_token, refresh_token, user_id)`.
#[allow(dead_code)]
pub async fn register_and_login(
    app: &axum::Router,
    email: &str,
    password: &str,
) -> (String, String, String) {
    register(app, email, password).await;
    let body = login(app, email, password).await;
    (
        body["token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
        body["id"].as_str().unwrap().to_string(),
    )
}
