//! Authentication extractors for bearer-token protected routes.
//!
//! `AuthUser` verifies the `Authorization: Bearer <token>` header, then
//! re-checks that the user still exists and is active. `AdminUser` adds the
//! admin gate: stored role `admin` or membership in the configured email
//! allow-list; either condition suffices.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use everwish_core::{Email, UserId, UserRole};

use crate::db::UserRepository;
use crate::services::auth::token;
use crate::state::AppState;

/// The authenticated user attached to a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
}

/// Rejection for failed authentication or authorization.
pub enum AuthRejection {
    /// No bearer token on the request.
    MissingToken,
    /// Token failed to decode or verify.
    InvalidToken,
    /// Token was valid but the user is gone or deactivated.
    UserInactive,
    /// Authenticated but not an admin.
    NotAdmin,
    /// The user lookup itself failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Access token required"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            Self::UserInactive => (StatusCode::UNAUTHORIZED, "User not found or inactive"),
            Self::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct AuthUser(pub CurrentUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;

        let claims = token::verify(&state.config().auth, token)
            .map_err(|_| AuthRejection::InvalidToken)?;

        // The token alone is not enough: the account must still exist and
        // be active.
        let user = UserRepository::new(state.pool())
            .get_by_id(claims.user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "user lookup failed during authentication");
                AuthRejection::Internal
            })?
            .ok_or(AuthRejection::UserInactive)?;

        if !user.is_active {
            return Err(AuthRejection::UserInactive);
        }

        Ok(Self(CurrentUser {
            id: user.id,
            email: user.email,
            role: user.role,
        }))
    }
}

/// Extractor that requires an authenticated admin.
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        let by_role = user.role == UserRole::Admin;
        let by_allow_list = state.config().auth.is_allow_listed(user.email.as_str());

        if !by_role && !by_allow_list {
            return Err(AuthRejection::NotAdmin);
        }

        Ok(Self(user))
    }
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/cart");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extraction() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_empty_value() {
        let parts = parts_with_auth(Some("Bearer "));
        assert_eq!(bearer_token(&parts), None);
    }
}
