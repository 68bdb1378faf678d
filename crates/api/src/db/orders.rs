//! Order repository: checkout writes and order reads.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use everwish_core::{ExperienceId, OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::order::{CustomerDetails, Order, OrderItem};

/// Columns selected for every [`Order`] read.
const ORDER_COLUMNS: &str = "id, user_id, payment_id, payment_method, status, first_name, \
     last_name, email, phone, address, city, pincode, state, total_amount, created_at";

/// Parameters for one order-item row, copied from the cart snapshot.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub experience_id: ExperienceId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub addons: Vec<String>,
}

/// Flat row for the admin order listing: header plus the first item and its
/// experience, when present.
#[derive(Debug, FromRow)]
pub struct AdminOrderRow {
    pub id: OrderId,
    pub user_id: UserId,
    pub payment_id: Option<String>,
    pub payment_method: String,
    pub status: OrderStatus,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub state: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub item_unit_price: Option<Decimal>,
    pub item_selected_date: Option<NaiveDate>,
    pub item_selected_time: Option<String>,
    pub item_addons: Option<Vec<String>>,
    pub experience_id: Option<ExperienceId>,
    pub experience_title: Option<String>,
    pub experience_category: Option<String>,
    pub experience_images: Option<Vec<String>>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order header and its items in a single transaction.
    ///
    /// Items are written with their snapshot position so "first item" reads
    /// are deterministic.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing
    /// is persisted in that case.
    pub async fn create_with_items(
        &self,
        user_id: UserId,
        customer: &CustomerDetails,
        payment_method: &str,
        total_amount: Decimal,
        items: &[NewOrderItem],
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (user_id, payment_id, payment_method, status, first_name, \
                 last_name, email, phone, address, city, pincode, state, total_amount) \
             VALUES ($1, NULL, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(payment_method)
        .bind(OrderStatus::Confirmed)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(&customer.pincode)
        .bind(&customer.state)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await?;

        let mut created = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let row = sqlx::query_as::<_, OrderItem>(
                "INSERT INTO order_items (order_id, experience_id, quantity, unit_price, \
                     selected_date, selected_time, addons, position) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 RETURNING id, order_id, experience_id, quantity, unit_price, selected_date, \
                     selected_time, addons",
            )
            .bind(order.id)
            .bind(item.experience_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.selected_date)
            .bind(item.selected_time.as_deref())
            .bind(&item.addons)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .fetch_one(&mut *tx)
            .await?;

            created.push(row);
        }

        tx.commit().await?;

        Ok((order, created))
    }

    /// A user's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Every order, newest first, flattened with its first item and that
    /// item's experience for the admin summary view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all_with_first_item(&self) -> Result<Vec<AdminOrderRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminOrderRow>(
            "SELECT o.id, o.user_id, o.payment_id, o.payment_method, o.status, o.first_name, \
                 o.last_name, o.email, o.phone, o.address, o.city, o.pincode, o.state, \
                 o.total_amount, o.created_at, \
                 oi.unit_price AS item_unit_price, \
                 oi.selected_date AS item_selected_date, \
                 oi.selected_time AS item_selected_time, \
                 oi.addons AS item_addons, \
                 e.id AS experience_id, \
                 e.title AS experience_title, \
                 e.category AS experience_category, \
                 e.images AS experience_images \
             FROM orders o \
             LEFT JOIN LATERAL ( \
                 SELECT * FROM order_items \
                 WHERE order_id = o.id \
                 ORDER BY position ASC \
                 LIMIT 1 \
             ) oi ON TRUE \
             LEFT JOIN experiences e ON e.id = oi.experience_id \
             ORDER BY o.created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Unconditionally overwrite an order's status.
    ///
    /// # Returns
    ///
    /// Returns `true` if the order existed, `false` otherwise (not an error).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order_id)
            .bind(status)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
