// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! HTTP handlers for the auth endpoints.
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::middleware::auth::AuthUser;
use crate::validation::{
    ChangePasswordInput, ForgetPasswordInput, LoginInput, RefreshInput, SignupInput,
};
use crate::{error::AppError, AppState};
use parley_common::ApiResponse;

/// Fallback header for the refresh token when it is not in the body.
const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> Result<impl IntoResponse, AppError> {
    let payload = state.auth.signup(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(payload, "User created")),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, AppError> {
    let payload = state.auth.login(input).await?;
    Ok(Json(ApiResponse::ok(payload, "Login successful")))
}

/// POST /api/auth/refresh
///
/// The refresh token is read from the JSON body first, then from the
/// `x-refresh-token` header. The body is parsed leniently so a header-only
/// request with an empty body still works.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let token = serde_json::from_slice::<RefreshInput>(&body)
        .ok()
        .and_then(|input| input.refresh_token)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .get(REFRESH_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        });

    let payload = state.auth.refresh(token)?;
    Ok(Json(ApiResponse::ok(payload, "Token refreshed")))
}

/// POST /api/auth/logout
pub async fn logout(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.logout(&user.user_id).await?;
    Ok(Json(ApiResponse::<()>::message("Logged out")))
}

/// POST /api/auth/change-password
pub async fn change_password(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ChangePasswordInput>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.change_password(&user.user_id, input).await?;
    Ok(Json(ApiResponse::<()>::message("Password changed")))
}

/// POST /api/auth/forget-password
pub async fn forget_password(
    State(state): State<AppState>,
    Json(input): Json<ForgetPasswordInput>,
) -> Result<impl IntoResponse, AppError> {
    let message = state.auth.forget_password(input).await?;
    Ok(Json(ApiResponse::<()>::message(message)))
}

/// GET /api/auth/me
pub async fn me(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.auth.profile(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(profile, "Success")))
}
