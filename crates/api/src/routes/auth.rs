//! Auth route handlers: registration, login, profile, token verification.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::user::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let auth = AuthService::new(state.pool(), &state.config().auth);
    let (user, token) = auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "user": user,
            "token": token,
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool(), &state.config().auth);
    let (user, token) = auth
        .login(request.email.as_deref(), request.password.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "user": user,
        "token": token,
    })))
}

/// POST /api/auth/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool(), &state.config().auth);
    let (user, token) = auth
        .admin_login(request.email.as_deref(), request.password.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Admin login successful",
        "user": user,
        "token": token,
    })))
}

/// GET /api/auth/profile
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool(), &state.config().auth);
    let profile = auth.get_profile(user.id).await?;

    Ok(Json(json!({ "success": true, "user": profile })))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(patch): Json<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool(), &state.config().auth);
    let profile = auth.update_profile(user.id, &patch).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": profile,
    })))
}

/// GET /api/auth/verify
///
/// Verifies the bearer token without a user lookup; the payload is echoed
/// back so clients can confirm who the token belongs to.
pub async fn verify(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<Value>> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| crate::error::AppError::Unauthorized("No token provided".to_string()))?;

    let auth = AuthService::new(state.pool(), &state.config().auth);
    let claims = auth.verify_token(token)?;

    Ok(Json(json!({
        "success": true,
        "message": "Token is valid",
        "user": {
            "userId": claims.user_id,
            "email": claims.email,
        },
    })))
}

/// POST /api/auth/logout
///
/// Tokens are held client-side; logout is an acknowledgment.
pub async fn logout() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Logged out successfully",
    }))
}

/// DELETE /api/auth/delete-account
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool(), &state.config().auth);
    auth.delete_account(user.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Account deleted successfully",
    })))
}
