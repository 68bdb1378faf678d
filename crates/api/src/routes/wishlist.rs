//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use everwish_core::ExperienceId;

use crate::db::WishlistRepository;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::wishlist::AddToWishlistRequest;
use crate::state::AppState;

/// GET /api/wishlist
pub async fn get_wishlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    let wishlist = WishlistRepository::new(state.pool()).list(user.id).await?;

    Ok(Json(json!({ "success": true, "wishlist": wishlist })))
}

/// POST /api/wishlist
pub async fn add(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<AddToWishlistRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let experience_id = request
        .experience_id
        .ok_or_else(|| AppError::Validation("Experience ID is required".to_string()))?;

    let item = WishlistRepository::new(state.pool())
        .add(user.id, experience_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Item added to wishlist",
            "item": item,
        })),
    ))
}

/// DELETE /api/wishlist/{experience_id}
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(experience_id): Path<ExperienceId>,
) -> Result<Json<Value>> {
    WishlistRepository::new(state.pool())
        .remove(user.id, experience_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Item removed from wishlist",
    })))
}

/// GET /api/wishlist/check/{experience_id}
pub async fn check(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(experience_id): Path<ExperienceId>,
) -> Result<Json<Value>> {
    let is_in_wishlist = WishlistRepository::new(state.pool())
        .contains(user.id, experience_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "isInWishlist": is_in_wishlist,
    })))
}

/// GET /api/wishlist/count
pub async fn count(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    let count = WishlistRepository::new(state.pool()).count(user.id).await?;

    Ok(Json(json!({ "success": true, "count": count })))
}
