//! Cart repository: (user, experience)-keyed line items over the
//! `user_cart` view.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use everwish_core::{ExperienceId, UserId};

use super::RepositoryError;
use crate::models::cart::CartItem;

/// Columns of the `user_cart` view, in [`CartItem`] order.
const CART_VIEW_COLUMNS: &str = "id, user_id, experience_id, quantity, selected_date, \
     selected_time, addons, added_at, title, slug, base_price, thumbnail_url, category, \
     subcategory, total_price";

/// Optional line extras captured when adding to the cart.
#[derive(Debug, Default, Clone)]
pub struct CartLineExtras {
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub addons: Vec<String>,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Current quantity of an existing line, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn existing_quantity(
        &self,
        user_id: UserId,
        experience_id: ExperienceId,
    ) -> Result<Option<i32>, RepositoryError> {
        let quantity: Option<i32> = sqlx::query_scalar(
            "SELECT quantity FROM cart WHERE user_id = $1 AND experience_id = $2",
        )
        .bind(user_id)
        .bind(experience_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(quantity)
    }

    /// Insert a fresh cart line and return the enriched row.
    ///
    /// The (user, experience) uniqueness constraint is the only safety net
    /// against concurrent duplicate adds; a constraint race surfaces as
    /// `Conflict`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the line already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert_line(
        &self,
        user_id: UserId,
        experience_id: ExperienceId,
        quantity: i32,
        extras: &CartLineExtras,
    ) -> Result<CartItem, RepositoryError> {
        sqlx::query(
            "INSERT INTO cart (user_id, experience_id, quantity, selected_date, selected_time, addons) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user_id)
        .bind(experience_id)
        .bind(quantity)
        .bind(extras.selected_date)
        .bind(extras.selected_time.as_deref())
        .bind(&extras.addons)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "experience already in cart"))?;

        self.get_line(user_id, experience_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Overwrite the quantity of an existing line and return the enriched row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        experience_id: ExperienceId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let result =
            sqlx::query("UPDATE cart SET quantity = $3 WHERE user_id = $1 AND experience_id = $2")
                .bind(user_id)
                .bind(experience_id)
                .bind(quantity)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_line(user_id, experience_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Remove a single line.
    ///
    /// # Returns
    ///
    /// Returns `true` if a line was removed, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_line(
        &self,
        user_id: UserId,
        experience_id: ExperienceId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart WHERE user_id = $1 AND experience_id = $2")
            .bind(user_id)
            .bind(experience_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// A single enriched line, if present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_line(
        &self,
        user_id: UserId,
        experience_id: ExperienceId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_VIEW_COLUMNS} FROM user_cart \
             WHERE user_id = $1 AND experience_id = $2"
        ))
        .bind(user_id)
        .bind(experience_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(item)
    }

    /// The user's full enriched cart, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_VIEW_COLUMNS} FROM user_cart \
             WHERE user_id = $1 ORDER BY added_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Number of lines in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Total cart value, summed over the enriched view's line totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total(&self, user_id: UserId) -> Result<Decimal, RepositoryError> {
        let total: Option<Decimal> =
            sqlx::query_scalar("SELECT SUM(total_price) FROM user_cart WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }

    /// Remove every line in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
