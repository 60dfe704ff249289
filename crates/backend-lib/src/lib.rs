// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core identity and session functionality for the Parley backend.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod store;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::service::AuthService;
use crate::auth::token::TokenService;
use crate::config::Settings;
use crate::middleware::rate_limit::RateLimiter;
use crate::store::UserStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Auth orchestration
    pub auth: Arc<AuthService>,
    /// User store backend
    pub store: Arc<dyn UserStore>,
    /// Token issuance and verification
    pub tokens: TokenService,
    /// Rate limiter; the only mutable state shared across requests
    pub rate_limiter: Arc<RateLimiter>,
    /// Settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state
    pub fn new(store: Arc<dyn UserStore>, settings: Settings) -> Self {
        let tokens = TokenService::from_settings(&settings);
        let auth = Arc::new(AuthService::new(store.clone(), tokens.clone()));
        let rate_limiter = Arc::new(RateLimiter::new(
            Duration::from_secs(settings.rate_limit.window_secs),
            settings.rate_limit.max_requests,
        ));

        Self {
            auth,
            store,
            tokens,
            rate_limiter,
            settings: Arc::new(settings),
        }
    }
}
