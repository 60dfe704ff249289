// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the Parley backend.

pub mod auth;
pub mod rate_limit;

pub use auth::{AdminUser, AuthUser};
pub use rate_limit::{rate_limit, RateDecision, RateLimiter};
