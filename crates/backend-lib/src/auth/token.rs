// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Access/refresh token issuance and verification.
//!
//! Both token kinds are HS256 JWTs, but they are signed with distinct
//! secrets: possession of an access token never allows forging a refresh
//! token, and vice versa. Verification is a pure function of the signed
//! claims; no server-side session state is consulted.
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Settings;
use crate::error::AppError;

/// Which secret a token was signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Signed claims. `sub` carries the user id.
#[derive(Debug, Serialize)]
struct Claims {
    sub: String,
    kind: TokenKind,
    iat: i64,
    exp: i64,
}

/// Claims as decoded during verification. `sub` and `kind` are optional so
/// a structurally valid but incomplete payload can be reported as malformed
/// rather than as a deserialization failure.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    kind: Option<TokenKind>,
    #[serde(default)]
    iat: i64,
    exp: i64,
}

/// A successfully verified token.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub user_id: String,
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

struct Inner {
    access_enc: EncodingKey,
    access_dec: DecodingKey,
    refresh_enc: EncodingKey,
    refresh_dec: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

/// Stateless token service. Cheap to clone; all handlers share one.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<Inner>,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_secs: u64,
        refresh_ttl_secs: u64,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                access_enc: EncodingKey::from_secret(access_secret.as_bytes()),
                access_dec: DecodingKey::from_secret(access_secret.as_bytes()),
                refresh_enc: EncodingKey::from_secret(refresh_secret.as_bytes()),
                refresh_dec: DecodingKey::from_secret(refresh_secret.as_bytes()),
                access_ttl_secs,
                refresh_ttl_secs,
            }),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.access_token_secret,
            &settings.refresh_token_secret,
            settings.access_ttl_secs,
            settings.refresh_ttl_secs,
        )
    }

    /// Issue an access token for a user.
    pub fn issue_access_token(&self, user_id: &str) -> Result<(String, DateTime<Utc>), AppError> {
        self.issue(
            user_id,
            TokenKind::Access,
            self.inner.access_ttl_secs as i64,
        )
    }

    /// Issue a refresh token for a user.
    pub fn issue_refresh_token(&self, user_id: &str) -> Result<(String, DateTime<Utc>), AppError> {
        self.issue(
            user_id,
            TokenKind::Refresh,
            self.inner.refresh_ttl_secs as i64,
        )
    }

    /// Verify an access token.
    pub fn verify_access_token(&self, token: &str) -> Result<VerifiedToken, AppError> {
        self.verify(token, TokenKind::Access, &self.inner.access_dec)
    }

    /// Verify a refresh token.
    pub fn verify_refresh_token(&self, token: &str) -> Result<VerifiedToken, AppError> {
        self.verify(token, TokenKind::Refresh, &self.inner.refresh_dec)
    }

    /// Exchange a valid refresh token for a brand-new access token. The
    /// refresh token itself is not rotated; the caller keeps reusing it
    /// until it expires naturally.
    pub fn rotate_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let verified = self.verify_refresh_token(refresh_token)?;
        self.issue_access_token(&verified.user_id)
    }

    fn issue(
        &self,
        user_id: &str,
        kind: TokenKind,
        ttl_secs: i64,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(ttl_secs);
        let claims = Claims {
            sub: user_id.to_string(),
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let key = match kind {
            TokenKind::Access => &self.inner.access_enc,
            TokenKind::Refresh => &self.inner.refresh_enc,
        };
        let token = encode(&Header::default(), &claims, key)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))?;
        Ok((token, expires_at))
    }

    fn verify(
        &self,
        token: &str,
        expected_kind: TokenKind,
        key: &DecodingKey,
    ) -> Result<VerifiedToken, AppError> {
        // Expiry is exact: no leeway unless explicitly configured.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<RawClaims>(token, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            ErrorKind::MissingRequiredClaim(_) => AppError::TokenMalformed,
            _ => AppError::TokenInvalid,
        })?;

        let claims = data.claims;
        let user_id = match claims.sub {
            Some(sub) if !sub.is_empty() => sub,
            _ => return Err(AppError::TokenMalformed),
        };
        if claims.kind != Some(expected_kind) {
            return Err(AppError::TokenInvalid);
        }

        Ok(VerifiedToken {
            user_id,
            kind: expected_kind,
            issued_at: Utc.timestamp_opt(claims.iat, 0).single().unwrap_or_default(),
            expires_at: Utc.timestamp_opt(claims.exp, 0).single().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("access-secret", "refresh-secret", 3600, 7200)
    }

    #[test]
    fn test_access_token_round_trip() {
        let svc = service();
        let (token, expires_at) = svc.issue_access_token("user-42").unwrap();

        let verified = svc.verify_access_token(&token).unwrap();
        assert_eq!(verified.user_id, "user-42");
        assert_eq!(verified.kind, TokenKind::Access);
        assert_eq!(verified.expires_at.timestamp(), expires_at.timestamp());
        assert!(verified.issued_at < verified.expires_at);
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let svc = service();
        let (token, _) = svc.issue_refresh_token("user-42").unwrap();
        let verified = svc.verify_refresh_token(&token).unwrap();
        assert_eq!(verified.user_id, "user-42");
        assert_eq!(verified.kind, TokenKind::Refresh);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let svc = service();
        let (access, _) = svc.issue_access_token("user-42").unwrap();
        let (refresh, _) = svc.issue_refresh_token("user-42").unwrap();

        // Signed with different secrets; the signature check alone rejects
        assert!(matches!(
            svc.verify_refresh_token(&access),
            Err(AppError::TokenInvalid)
        ));
        assert!(matches!(
            svc.verify_access_token(&refresh),
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn test_kind_claim_is_checked_even_under_the_right_secret() {
        // Same secret for both kinds: the signature passes, the kind claim
        // must still match.
        let svc = TokenService::new("shared", "shared", 3600, 7200);
        let (refresh, _) = svc.issue_refresh_token("user-42").unwrap();
        assert!(matches!(
            svc.verify_access_token(&refresh),
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected_as_expired() {
        let svc = service();
        let (token, _) = svc.issue("user-42", TokenKind::Access, -2).unwrap();
        assert!(matches!(
            svc.verify_access_token(&token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_token_valid_just_before_expiry() {
        let svc = service();
        let (token, _) = svc.issue("user-42", TokenKind::Access, 2).unwrap();
        assert!(svc.verify_access_token(&token).is_ok());
    }

    #[test]
    fn test_garbage_and_tampered_tokens_are_invalid() {
        let svc = service();
        assert!(matches!(
            svc.verify_access_token("not.a.token"),
            Err(AppError::TokenInvalid)
        ));

        let (mut token, _) = svc.issue_access_token("user-42").unwrap();
        token.push('x');
        assert!(matches!(
            svc.verify_access_token(&token),
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn test_payload_without_user_id_is_malformed() {
        let svc = service();

        #[derive(Serialize)]
        struct NoSub {
            kind: TokenKind,
            iat: i64,
            exp: i64,
        }
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::default(),
            &NoSub {
                kind: TokenKind::Access,
                iat: now,
                exp: now + 3600,
            },
            &EncodingKey::from_secret(b"access-secret"),
        )
        .unwrap();

        assert!(matches!(
            svc.verify_access_token(&token),
            Err(AppError::TokenMalformed)
        ));
    }

    #[test]
    fn test_rotate_access_token() {
        let svc = service();
        let (refresh, _) = svc.issue_refresh_token("user-42").unwrap();

        let (new_access, _) = svc.rotate_access_token(&refresh).unwrap();
        let verified = svc.verify_access_token(&new_access).unwrap();
        assert_eq!(verified.user_id, "user-42");

        // An access token must not drive rotation
        let (access, _) = svc.issue_access_token("user-42").unwrap();
        assert!(matches!(
            svc.rotate_access_token(&access),
            Err(AppError::TokenInvalid)
        ));
    }
}
