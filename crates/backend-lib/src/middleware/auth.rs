// ============================
// crates/backend-lib/src/middleware/auth.rs
// ============================
//! Session verification gate.
//!
//! Extractors that authenticate a request from its `Authorization` header.
//! The verified identity is an immutable, request-scoped value handed to the
//! handler; nothing is attached to or mutated on the request itself.
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::store::Role;
use crate::AppState;

/// The authenticated identity of the current request.
///
/// Produced by verifying the bearer access token; never cached across
/// requests.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenMissing)?;
        if token.is_empty() {
            return Err(AppError::TokenMissing);
        }

        // TokenExpired propagates with its own error code so clients can
        // run their refresh flow; every other failure is a plain 401.
        let verified = state.tokens.verify_access_token(token)?;

        Ok(AuthUser {
            user_id: verified.user_id,
        })
    }
}

/// Admin-only gate layered on `AuthUser`.
///
/// Loads the user's role with a single uncached store read. A record that
/// vanished after authentication and an insufficient role answer
/// identically, so the response never reveals which one happened.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        match state.store.find_by_id(&auth.user_id).await? {
            Some(user) if user.role == Role::Admin => Ok(AdminUser(auth)),
            _ => Err(AppError::Forbidden),
        }
    }
}
