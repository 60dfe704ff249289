// ============================
// crates/backend-lib/src/middleware/rate_limit.rs
// ============================
//! Fixed-window rate limiting for the public auth endpoints.
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use metrics::counter;
use std::time::{Duration, Instant};

use crate::{error::AppError, AppState};

/// Decision for one request against one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Denied { retry_after_secs: u64 },
}

/// Counter state for a single key.
#[derive(Debug)]
struct Bucket {
    count: u32,
    window_reset_at: Instant,
}

/// Fixed-window request counter.
///
/// Owned by `AppState` and injected where needed; admission control only,
/// not a security boundary, and not persisted across restarts.
#[derive(Debug)]
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            buckets: DashMap::new(),
            window,
            max_requests,
        }
    }

    /// Count one request against `key` and decide whether to admit it.
    pub fn check_and_consume(&self, key: &str) -> RateDecision {
        let now = Instant::now();

        // The entry guard holds the shard lock for the whole
        // read-modify-write, so updates to one key never interleave.
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket {
                count: 0,
                window_reset_at: now + self.window,
            });

        if now >= bucket.window_reset_at {
            bucket.count = 1;
            bucket.window_reset_at = now + self.window;
            return RateDecision::Allowed;
        }

        bucket.count += 1;
        if bucket.count > self.max_requests {
            let remaining = bucket.window_reset_at.saturating_duration_since(now);
            let mut retry_after_secs = remaining.as_secs();
            if remaining.subsec_nanos() > 0 {
                retry_after_secs += 1;
            }
            RateDecision::Denied {
                retry_after_secs: retry_after_secs.max(1),
            }
        } else {
            RateDecision::Allowed
        }
    }

    /// Drop buckets whose window has elapsed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.buckets.retain(|_, bucket| now < bucket.window_reset_at);
    }
}

/// Rate limiter middleware
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);

    match state.rate_limiter.check_and_consume(&key) {
        RateDecision::Allowed => Ok(next.run(request).await),
        RateDecision::Denied { retry_after_secs } => {
            counter!("rate_limit.rejected").increment(1);
            tracing::warn!(%key, retry_after_secs, "rate limit exceeded");
            Err(AppError::RateLimitExceeded { retry_after_secs })
        },
    }
}

/// Bucket key: client identity + method + route.
fn client_key(request: &Request) -> String {
    let headers = request.headers();
    let ip = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
        })
        .unwrap_or("unknown");

    format!("{ip}:{}:{}", request.method(), request.uri().path())
}
