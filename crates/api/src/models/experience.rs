//! Experience (catalog item) entity and admin request types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use everwish_core::{ExperienceId, Slug, TemplateType};

/// A bookable catalog item.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Experience {
    pub id: ExperienceId,
    pub title: String,
    pub slug: Slug,
    pub category: String,
    pub subcategory: Option<String>,
    pub description: String,
    pub short_desc: String,
    pub base_price: Decimal,
    pub images: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub template_type: TemplateType,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Admin request to create an experience.
///
/// `images` accepts raw inputs (hosting links, URLs, base64 data) which are
/// run through the image pipeline before the row is written.
#[derive(Debug, Deserialize)]
pub struct NewExperience {
    pub title: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub description: String,
    pub short_desc: String,
    pub base_price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub template_type: TemplateType,
    #[serde(default)]
    pub is_featured: bool,
}

/// Admin request to update an experience; only present fields are applied.
///
/// The slug is regenerated only when `title` is present in the patch.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExperience {
    pub title: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub short_desc: Option<String>,
    pub base_price: Option<Decimal>,
    pub images: Option<Vec<String>>,
    pub thumbnail_url: Option<String>,
    pub template_type: Option<TemplateType>,
    pub is_featured: Option<bool>,
}

/// Exact-match catalog filters, composed conjunctively.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ExperienceFilters {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub is_featured: Option<bool>,
    pub template_type: Option<TemplateType>,
}

impl ExperienceFilters {
    /// Shorthand for the featured-only listing.
    #[must_use]
    pub fn featured() -> Self {
        Self {
            is_featured: Some(true),
            ..Self::default()
        }
    }

    /// Shorthand for a single-category listing.
    #[must_use]
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }
}
