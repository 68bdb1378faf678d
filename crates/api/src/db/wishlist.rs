//! Wishlist repository: (user, experience)-keyed lines over the
//! `user_wishlist` view.

use sqlx::PgPool;

use everwish_core::{ExperienceId, UserId};

use super::RepositoryError;
use crate::models::wishlist::WishlistItem;

/// Columns of the `user_wishlist` view, in [`WishlistItem`] order.
const WISHLIST_VIEW_COLUMNS: &str = "id, user_id, experience_id, created_at, title, slug, \
     base_price, thumbnail_url, category, subcategory";

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a wishlist line and return the enriched row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the pair is already wishlisted.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user_id: UserId,
        experience_id: ExperienceId,
    ) -> Result<WishlistItem, RepositoryError> {
        sqlx::query("INSERT INTO wishlist (user_id, experience_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(experience_id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "experience already wishlisted"))?;

        let item = sqlx::query_as::<_, WishlistItem>(&format!(
            "SELECT {WISHLIST_VIEW_COLUMNS} FROM user_wishlist \
             WHERE user_id = $1 AND experience_id = $2"
        ))
        .bind(user_id)
        .bind(experience_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(item)
    }

    /// Remove a wishlist line.
    ///
    /// # Returns
    ///
    /// Returns `true` if a line was removed, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        experience_id: ExperienceId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND experience_id = $2")
            .bind(user_id)
            .bind(experience_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The user's full enriched wishlist, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let items = sqlx::query_as::<_, WishlistItem>(&format!(
            "SELECT {WISHLIST_VIEW_COLUMNS} FROM user_wishlist \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Membership check for a single experience.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(
        &self,
        user_id: UserId,
        experience_id: ExperienceId,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM wishlist WHERE user_id = $1 AND experience_id = $2)",
        )
        .bind(user_id)
        .bind(experience_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Number of lines in the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wishlist WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
