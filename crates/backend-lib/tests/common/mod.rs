// ==============================
// crates/backend-lib/tests/common/mod.rs
// ==============================
//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use backend_lib::{config::Settings, router::create_router, store::MemoryUserStore, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;

/// Settings with test secrets injected.
pub fn test_settings() -> Settings {
    Settings {
        access_token_secret: "test-access-secret".to_string(),
        refresh_token_secret: "test-refresh-secret".to_string(),
        ..Settings::default()
    }
}

pub fn test_state(settings: Settings) -> AppState {
    AppState::new(Arc::new(MemoryUserStore::new()), settings)
}

/// Router plus its state, so tests can reach behind the HTTP surface.
pub fn app(settings: Settings) -> (Router, AppState) {
    let state = test_state(settings);
    (create_router(state.clone()), state)
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json_authed(uri: &str, body: &Value, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<axum::body::Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Signup body for the default test user.
pub fn alice() -> Value {
    serde_json::json!({
        "username": "alice1",
        "email": "a@x.com",
        "password": "secret1",
    })
}
