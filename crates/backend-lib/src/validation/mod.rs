// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Typed request inputs and field-level validation.
//!
//! Every public endpoint deserializes into one of the input structs below and
//! runs it through an explicit `validate_*` function before any credential or
//! store work happens. Validation returns either a normalized value or the
//! full set of per-field failures.

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;

// Common validation constants
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 32;
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_EMAIL_LENGTH: usize = 128;

// Regex patterns for validation
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// A single field failure.
#[derive(Debug, Clone)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// All field failures for one request.
#[derive(Debug, Clone, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Field-to-message map for the response envelope.
    pub fn to_details(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .0
            .iter()
            .map(|e| (e.field.to_string(), e.message.clone().into()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

/// Body of POST /api/auth/signup
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of POST /api/auth/login
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Body of POST /api/auth/refresh; the token may instead arrive in the
/// `x-refresh-token` header.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshInput {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body of POST /api/auth/change-password
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub old_password: String,
    pub new_password: String,
}

/// Body of POST /api/auth/forget-password
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgetPasswordInput {
    pub email: String,
}

/// Signup input after validation, with the email normalized.
#[derive(Debug, Clone)]
pub struct ValidSignup {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login input after validation, with the email normalized.
#[derive(Debug, Clone)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

fn check_username(errors: &mut FieldErrors, username: &str) {
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        errors.push(
            "username",
            format!(
                "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
            ),
        );
    } else if !USERNAME_REGEX.is_match(username) {
        errors.push(
            "username",
            "Username can only contain letters, numbers, underscores, and hyphens",
        );
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.is_empty() {
        errors.push("email", "Email address cannot be empty");
    } else if email.len() > MAX_EMAIL_LENGTH {
        errors.push(
            "email",
            format!("Email address cannot exceed {MAX_EMAIL_LENGTH} characters"),
        );
    } else if !EMAIL_REGEX.is_match(email) {
        errors.push("email", "Invalid email address format");
    }
}

fn check_password(errors: &mut FieldErrors, field: &'static str, password: &str) {
    if password.len() < MIN_PASSWORD_LENGTH {
        errors.push(
            field,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    } else if password.len() > MAX_PASSWORD_LENGTH {
        errors.push(
            field,
            format!("Password cannot exceed {MAX_PASSWORD_LENGTH} characters"),
        );
    }
}

/// Normalize an email the way the store expects it: trimmed, lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a signup request.
pub fn validate_signup(input: &SignupInput) -> Result<ValidSignup, FieldErrors> {
    let mut errors = FieldErrors::default();
    let username = input.username.trim();
    let email = normalize_email(&input.email);

    check_username(&mut errors, username);
    check_email(&mut errors, &email);
    check_password(&mut errors, "password", &input.password);

    if errors.is_empty() {
        Ok(ValidSignup {
            username: username.to_string(),
            email,
            password: input.password.clone(),
        })
    } else {
        Err(errors)
    }
}

/// Validate a login request. Password rules are not re-checked here; an
/// out-of-policy password simply fails verification downstream.
pub fn validate_login(input: &LoginInput) -> Result<ValidLogin, FieldErrors> {
    let mut errors = FieldErrors::default();
    let email = normalize_email(&input.email);

    check_email(&mut errors, &email);
    if input.password.is_empty() {
        errors.push("password", "Password is required");
    }

    if errors.is_empty() {
        Ok(ValidLogin {
            email,
            password: input.password.clone(),
        })
    } else {
        Err(errors)
    }
}

/// Validate a change-password request's new password shape.
pub fn validate_new_password(input: &ChangePasswordInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if input.old_password.is_empty() {
        errors.push("oldPassword", "Current password is required");
    }
    check_password(&mut errors, "newPassword", &input.new_password);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a forget-password request.
pub fn validate_forget_password(input: &ForgetPasswordInput) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::default();
    let email = normalize_email(&input.email);
    check_email(&mut errors, &email);

    if errors.is_empty() {
        Ok(email)
    } else {
        Err(errors)
    }
}
