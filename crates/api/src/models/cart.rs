//! Cart line types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use everwish_core::{CartLineId, ExperienceId, Slug, UserId};

/// A cart line enriched with catalog columns via the `user_cart` view.
///
/// Callers never need a second catalog lookup: title, slug, price, thumbnail
/// and category ride along, and `total_price` is `quantity * base_price`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
    pub id: CartLineId,
    pub user_id: UserId,
    pub experience_id: ExperienceId,
    pub quantity: i32,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub addons: Vec<String>,
    pub added_at: DateTime<Utc>,
    pub title: String,
    pub slug: Slug,
    pub base_price: Decimal,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub total_price: Decimal,
}

/// Request body for `POST /api/cart`.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub experience_id: Option<ExperienceId>,
    pub quantity: Option<i32>,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub addons: Option<Vec<String>>,
}

/// Request body for `PUT /api/cart`.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub experience_id: Option<ExperienceId>,
    pub quantity: Option<i32>,
}
