//! Cart route handlers.
//!
//! Adding an existing (user, experience) pair increments its quantity
//! instead of duplicating the line; updating a quantity to zero or below
//! removes the line and says so.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use everwish_core::ExperienceId;

use crate::db::cart::{CartLineExtras, CartRepository};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::cart::{AddToCartRequest, UpdateCartRequest};
use crate::state::AppState;

/// GET /api/cart
pub async fn get_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.list(user.id).await?;
    let total = repo.total(user.id).await?;

    Ok(Json(json!({
        "success": true,
        "cart": cart,
        "total": total,
    })))
}

/// POST /api/cart
pub async fn add(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let experience_id = request
        .experience_id
        .ok_or_else(|| AppError::Validation("Experience ID is required".to_string()))?;

    let quantity = request.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::Validation(
            "Quantity must be greater than 0".to_string(),
        ));
    }

    let repo = CartRepository::new(state.pool());

    // Upsert: an existing pair gets its quantity incremented.
    let item = match repo.existing_quantity(user.id, experience_id).await? {
        Some(existing) => {
            repo.update_quantity(user.id, experience_id, existing + quantity)
                .await?
        }
        None => {
            let extras = CartLineExtras {
                selected_date: request.selected_date,
                selected_time: request.selected_time,
                addons: request.addons.unwrap_or_default(),
            };
            repo.insert_line(user.id, experience_id, quantity, &extras)
                .await?
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Item added to cart",
            "item": item,
        })),
    ))
}

/// PUT /api/cart
pub async fn update_quantity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<Value>> {
    let experience_id = request
        .experience_id
        .ok_or_else(|| AppError::Validation("Experience ID is required".to_string()))?;
    let quantity = request
        .quantity
        .ok_or_else(|| AppError::Validation("Quantity is required".to_string()))?;

    let repo = CartRepository::new(state.pool());

    // Zero or negative means remove, reported distinctly from an update.
    if quantity <= 0 {
        repo.remove_line(user.id, experience_id).await?;
        return Ok(Json(json!({
            "success": true,
            "message": "Item removed from cart",
            "removed": true,
        })));
    }

    let item = repo
        .update_quantity(user.id, experience_id, quantity)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Item not in cart".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Cart item updated",
        "item": item,
    })))
}

/// DELETE /api/cart/{experience_id}
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(experience_id): Path<ExperienceId>,
) -> Result<Json<Value>> {
    CartRepository::new(state.pool())
        .remove_line(user.id, experience_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Item removed from cart",
    })))
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    CartRepository::new(state.pool()).clear(user.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Cart cleared",
    })))
}

/// GET /api/cart/count
pub async fn count(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    let count = CartRepository::new(state.pool()).count(user.id).await?;

    Ok(Json(json!({ "success": true, "count": count })))
}
