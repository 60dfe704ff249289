// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! shared between the Parley backend and its clients.
//! This module defines the JSON response envelope and the public
//! projections of server-side records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard response envelope for every API endpoint.
///
/// `data` is present on success, `error` carries a stable machine-readable
/// code on failure, and `details` carries per-field validation messages
/// when the failure was caused by malformed input.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Human-readable summary of the outcome
    pub message: String,
    /// Payload, omitted on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Stable error code, omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Field-level error messages, only set for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Server time at which the response was produced
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// Success envelope with a payload.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Success envelope without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Failure envelope with a machine-readable error code.
    pub fn fail(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Failure envelope carrying per-field details.
    pub fn fail_with_details(
        message: impl Into<String>,
        error: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::fail(message, error)
        }
    }
}

/// Client-safe projection of a user record.
///
/// Never contains the password hash; construct it only from a server-side
/// record that has already been authenticated or created.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    /// Opaque user identifier
    pub id: String,
    /// Unique display handle
    pub username: String,
    /// Unique, lowercase-normalized address
    pub email: String,
    /// Optional avatar location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Whether the user currently holds an open session
    pub is_online: bool,
    /// Last time the user was seen, if ever
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload returned by signup and login.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

/// Payload returned by the refresh endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPayload {
    pub access_token: String,
}
