// ============================
// crates/backend-lib/src/auth/service.rs
// ============================
//! Auth orchestration: signup, login, refresh, logout, password flows.
//!
//! Composes the credential hasher, the token service, and the user store.
//! Every operation is request-scoped; the hash and token work happen before
//! the single store write they precede, so an aborted request leaves no
//! partial state behind.
use chrono::Utc;
use metrics::counter;
use std::sync::Arc;

use crate::auth::password::{hash_password_secure, verify_password};
use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::store::{NewUser, UserStore};
use crate::validation::{
    validate_forget_password, validate_login, validate_new_password, validate_signup,
    ChangePasswordInput, ForgetPasswordInput, LoginInput, SignupInput,
};
use parley_common::{AuthPayload, PublicUser, RefreshPayload};

/// The message returned by forget-password regardless of whether the
/// account exists.
pub const FORGET_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, password reset instructions have been sent";

/// Orchestrates the auth flows over an injected user store.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new user and start a session.
    pub async fn signup(&self, input: SignupInput) -> Result<AuthPayload, AppError> {
        let valid = validate_signup(&input)?;

        if self.store.find_by_email(&valid.email).await?.is_some() {
            return Err(AppError::DuplicateUser);
        }
        if self.store.find_by_username(&valid.username).await?.is_some() {
            return Err(AppError::DuplicateUser);
        }

        let mut password = valid.password;
        let password_hash = hash_password_secure(&mut password)?;

        let user = self
            .store
            .create(NewUser {
                username: valid.username,
                email: valid.email,
                password_hash,
                avatar_url: None,
            })
            .await?;

        let payload = self.issue_pair(user.to_public())?;
        counter!("auth.signup").increment(1);
        tracing::info!(user_id = %payload.user.id, "user signed up");
        Ok(payload)
    }

    /// Authenticate by email and password.
    ///
    /// Unknown email and wrong password fail identically so the endpoint
    /// cannot be used to enumerate accounts.
    pub async fn login(&self, input: LoginInput) -> Result<AuthPayload, AppError> {
        let valid = validate_login(&input)?;

        let mut user = self
            .store
            .find_by_email(&valid.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&user.password_hash, &valid.password) {
            counter!("auth.login.failed").increment(1);
            return Err(AppError::InvalidCredentials);
        }

        let now = Utc::now();
        user.is_online = true;
        user.last_seen = Some(now);
        user.updated_at = now;
        self.store.save(&user).await?;

        let payload = self.issue_pair(user.to_public())?;
        counter!("auth.login.success").increment(1);
        tracing::info!(user_id = %payload.user.id, "user logged in");
        Ok(payload)
    }

    /// Exchange a refresh token for a new access token. The endpoint is
    /// unauthenticated; the refresh token itself is the credential.
    pub fn refresh(&self, refresh_token: Option<String>) -> Result<RefreshPayload, AppError> {
        let token = match refresh_token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AppError::RefreshTokenMissing),
        };

        let (access_token, _expires_at) = self.tokens.rotate_access_token(&token)?;
        counter!("auth.refresh").increment(1);
        Ok(RefreshPayload { access_token })
    }

    /// End a session. Token invalidation is the client's job (tokens are
    /// stateless and there is no blacklist); the server only clears the
    /// presence flag.
    pub async fn logout(&self, user_id: &str) -> Result<(), AppError> {
        if let Some(mut user) = self.store.find_by_id(user_id).await? {
            let now = Utc::now();
            user.is_online = false;
            user.last_seen = Some(now);
            user.updated_at = now;
            self.store.save(&user).await?;
        }
        tracing::info!(user_id = %user_id, "user logged out");
        Ok(())
    }

    /// Replace the password of an authenticated user. Outstanding tokens
    /// remain valid until their natural expiry.
    pub async fn change_password(
        &self,
        user_id: &str,
        input: ChangePasswordInput,
    ) -> Result<(), AppError> {
        let mut user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !verify_password(&user.password_hash, &input.old_password) {
            return Err(AppError::InvalidCredentials);
        }

        validate_new_password(&input)?;

        let mut new_password = input.new_password;
        user.password_hash = hash_password_secure(&mut new_password)?;
        user.updated_at = Utc::now();
        self.store.save(&user).await?;

        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }

    /// Start the password-reset flow. Always answers with the same generic
    /// message so the endpoint leaks nothing about account existence; the
    /// actual notification channel is an upstream concern.
    pub async fn forget_password(&self, input: ForgetPasswordInput) -> Result<&'static str, AppError> {
        let email = validate_forget_password(&input)?;

        let known = self.store.find_by_email(&email).await?.is_some();
        tracing::debug!(known_account = known, "password reset requested");

        Ok(FORGET_PASSWORD_MESSAGE)
    }

    /// Load the public profile of an authenticated user.
    pub async fn profile(&self, user_id: &str) -> Result<PublicUser, AppError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        Ok(user.to_public())
    }

    fn issue_pair(&self, user: PublicUser) -> Result<AuthPayload, AppError> {
        let (access_token, _) = self.tokens.issue_access_token(&user.id)?;
        let (refresh_token, _) = self.tokens.issue_refresh_token(&user.id)?;
        Ok(AuthPayload {
            user,
            access_token,
            refresh_token,
        })
    }
}
