// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router assembly.
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::auth as auth_handlers;
use crate::middleware::rate_limit::rate_limit;
use crate::AppState;

/// Create the application router.
///
/// Public endpoints carry the fixed-window rate limiter; protected
/// endpoints are gated by the access-token extractor instead.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/signup", post(auth_handlers::signup))
        .route("/login", post(auth_handlers::login))
        .route("/refresh", post(auth_handlers::refresh))
        .route("/forget-password", post(auth_handlers::forget_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let protected = Router::new()
        .route("/logout", post(auth_handlers::logout))
        .route("/change-password", post(auth_handlers::change_password))
        .route("/me", get(auth_handlers::me));

    Router::new()
        .nest("/api/auth", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
