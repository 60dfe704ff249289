// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level filter
    pub log_level: String,
    /// Secret for signing access tokens
    pub access_token_secret: String,
    /// Secret for signing refresh tokens; must differ from the access
    /// secret so one token kind can never be replayed as the other
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
    /// Rate limit settings
    pub rate_limit: RateLimitSettings,
}

/// Fixed-window rate limit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Window length in seconds
    pub window_secs: u64,
    /// Maximum requests per key per window
    pub max_requests: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            log_level: "info".to_string(),
            // Development fallbacks; production injects real secrets through
            // PARLEY_* environment variables.
            access_token_secret: "dev-access-secret".to_string(),
            refresh_token_secret: "dev-refresh-secret".to_string(),
            access_ttl_secs: 60 * 60 * 24 * 7,    // 7 days
            refresh_ttl_secs: 60 * 60 * 24 * 30,  // 30 days
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 20,
        }
    }
}

impl Settings {
    /// Load settings: defaults, then `parley.toml`, then `PARLEY_`-prefixed
    /// environment variables (nested keys split on `__`).
    pub fn load() -> Result<Self> {
        Self::load_from("parley.toml")
    }

    /// Load settings from an explicit config file path
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PARLEY_").split("__"))
            .extract()?;
        Ok(settings)
    }
}
