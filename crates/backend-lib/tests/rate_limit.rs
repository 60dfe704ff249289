// ==============================
// crates/backend-lib/tests/rate_limit.rs
// ==============================
//! Rate limiting behavior over the HTTP surface.
mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use tower::ServiceExt;

fn limited_settings(max_requests: u32) -> backend_lib::config::Settings {
    let mut settings = test_settings();
    settings.rate_limit.max_requests = max_requests;
    settings
}

fn login_from(ip: &str) -> axum::http::Request<axum::body::Body> {
    let body = json!({"email": "a@x.com", "password": "wrong"});
    axum::http::Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .header("x-real-ip", ip)
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_requests_over_the_limit_get_429() {
    let (app, _) = app(limited_settings(3));

    for _ in 0..3 {
        let response = app.clone().oneshot(login_from("10.0.0.1")).await.unwrap();
        // Counted and admitted; the credentials are wrong but that is the
        // handler's verdict, not the limiter's
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app.clone().oneshot(login_from("10.0.0.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .expect("429 must carry Retry-After")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);
    assert!(retry_after <= 60);

    assert_eq!(body_json(response).await["error"], "RATE_001");
}

#[tokio::test]
async fn test_clients_are_limited_independently() {
    let (app, _) = app(limited_settings(1));

    assert_eq!(
        app.clone()
            .oneshot(login_from("10.0.0.1"))
            .await
            .unwrap()
            .status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.clone()
            .oneshot(login_from("10.0.0.1"))
            .await
            .unwrap()
            .status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    // A different client identity still gets through
    assert_eq!(
        app.oneshot(login_from("10.0.0.2")).await.unwrap().status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_routes_are_limited_independently() {
    let (app, _) = app(limited_settings(1));

    assert_eq!(
        app.clone()
            .oneshot(login_from("10.0.0.1"))
            .await
            .unwrap()
            .status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.clone()
            .oneshot(login_from("10.0.0.1"))
            .await
            .unwrap()
            .status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    // The key includes the route, so another endpoint is unaffected
    let forget = axum::http::Request::builder()
        .method("POST")
        .uri("/api/auth/forget-password")
        .header("content-type", "application/json")
        .header("x-real-ip", "10.0.0.1")
        .body(axum::body::Body::from(
            json!({"email": "a@x.com"}).to_string(),
        ))
        .unwrap();
    assert_eq!(
        app.oneshot(forget).await.unwrap().status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_protected_routes_are_not_rate_limited() {
    let (app, _) = app(limited_settings(1));

    // The gate rejects these, but the limiter never sees them
    for _ in 0..5 {
        let request = axum::http::Request::builder()
            .method("GET")
            .uri("/api/auth/me")
            .header("x-real-ip", "10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
