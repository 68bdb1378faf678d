//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use everwish_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::{AdminUser, AuthUser};
use crate::models::order::CreateOrderRequest;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let order = OrderService::new(state.pool())
        .create_order(user.id, &request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "order": order })),
    ))
}

/// GET /api/orders
pub async fn list_own(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    let orders = OrderService::new(state.pool()).get_orders(user.id).await?;

    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// GET /api/admin/orders (admin)
pub async fn list_all(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Value>> {
    let orders = OrderService::new(state.pool()).get_all_orders().await?;

    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// Request body for the status overwrite.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<OrderStatus>,
}

/// PUT /api/admin/orders/{order_id}/status (admin)
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(order_id): Path<OrderId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>> {
    let status = request
        .status
        .ok_or_else(|| AppError::Validation("Order ID and status are required".to_string()))?;

    let updated = OrderService::new(state.pool())
        .update_order_status(order_id, status)
        .await?;

    if !updated {
        return Err(AppError::NotFound("Order not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Order status updated successfully",
    })))
}
