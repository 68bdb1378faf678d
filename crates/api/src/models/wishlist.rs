//! Wishlist line types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use everwish_core::{ExperienceId, Slug, UserId, WishlistLineId};

/// A wishlist line enriched with catalog columns via the `user_wishlist` view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WishlistItem {
    pub id: WishlistLineId,
    pub user_id: UserId,
    pub experience_id: ExperienceId,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub slug: Slug,
    pub base_price: Decimal,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
}

/// Request body for `POST /api/wishlist`.
#[derive(Debug, Deserialize)]
pub struct AddToWishlistRequest {
    pub experience_id: Option<ExperienceId>,
}
