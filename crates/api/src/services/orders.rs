//! Order workflow: cart snapshot → order + items → cart clear.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use everwish_core::{OrderId, OrderStatus, UserId};

use crate::db::orders::{AdminOrderRow, NewOrderItem, OrderRepository};
use crate::db::{CartRepository, RepositoryError};
use crate::models::order::{
    AdminOrderSummary, CreateOrderRequest, CustomerDetails, EventSummary, Order, PlacedOrder,
};

/// Errors that can occur during the order workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A required request field is missing.
    #[error("{0}")]
    MissingFields(&'static str),

    /// Order creation is refused on an empty cart, never defaulted to a
    /// zero-value order.
    #[error("Cart is empty")]
    EmptyCart,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order workflow service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order from the user's current cart.
    ///
    /// Reads the enriched cart snapshot, computes the total from the
    /// snapshot's line totals, writes the order header (status `confirmed`,
    /// unconditionally) and one item per cart line copying the snapshot's
    /// quantity/unit-price/date/time/add-ons, then clears the cart.
    ///
    /// A cart-clear failure is logged and swallowed: the order is considered
    /// placed even when the cart survives. Order durability wins over cart
    /// hygiene here.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::MissingFields` if the customer or payment method
    /// is absent.
    /// Returns `OrderError::EmptyCart` when the cart has no lines.
    /// Returns `OrderError::Repository` when the order write fails; nothing
    /// is persisted in that case.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        request: &CreateOrderRequest,
    ) -> Result<PlacedOrder, OrderError> {
        let Some(customer) = &request.customer else {
            return Err(OrderError::MissingFields("Customer details are required"));
        };
        let Some(payment_method) = request.payment_method.as_deref() else {
            return Err(OrderError::MissingFields("Payment method is required"));
        };

        let cart = CartRepository::new(self.pool);
        let snapshot = cart.list(user_id).await?;

        if snapshot.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let total: Decimal = snapshot.iter().map(|line| line.total_price).sum();

        let items: Vec<NewOrderItem> = snapshot
            .iter()
            .map(|line| NewOrderItem {
                experience_id: line.experience_id,
                quantity: line.quantity,
                unit_price: line.base_price,
                selected_date: request.selected_date.or(line.selected_date),
                selected_time: request
                    .selected_time
                    .clone()
                    .or_else(|| line.selected_time.clone()),
                addons: line.addons.clone(),
            })
            .collect();

        let (order, items) = OrderRepository::new(self.pool)
            .create_with_items(user_id, customer, payment_method, total, &items)
            .await?;

        if let Err(e) = cart.clear(user_id).await {
            tracing::warn!(%user_id, order_id = %order.id, error = %e,
                "failed to clear cart after order");
        }

        Ok(PlacedOrder { order, items })
    }

    /// The user's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the read fails.
    pub async fn get_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        let orders = OrderRepository::new(self.pool).list_for_user(user_id).await?;
        Ok(orders)
    }

    /// Every order flattened for the admin listing.
    ///
    /// Each summary derives its representative event from the order's first
    /// item only.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the read fails.
    pub async fn get_all_orders(&self) -> Result<Vec<AdminOrderSummary>, OrderError> {
        let rows = OrderRepository::new(self.pool)
            .list_all_with_first_item()
            .await?;

        Ok(rows.into_iter().map(summarize).collect())
    }

    /// Unconditionally overwrite an order's status.
    ///
    /// # Returns
    ///
    /// Returns `false` (not an error) when the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the write fails.
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, OrderError> {
        let updated = OrderRepository::new(self.pool)
            .update_status(order_id, status)
            .await?;
        Ok(updated)
    }
}

/// Flatten an admin order row into its summary shape.
fn summarize(row: AdminOrderRow) -> AdminOrderSummary {
    let event = match (&row.experience_id, &row.experience_title) {
        (Some(id), Some(title)) => EventSummary {
            id: id.to_string(),
            title: title.clone(),
            category: row
                .experience_category
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            price: row.item_unit_price.unwrap_or(Decimal::ZERO),
            image: row
                .experience_images
                .as_ref()
                .and_then(|images| images.first().cloned())
                .unwrap_or_else(|| "/placeholder.svg".to_string()),
        },
        _ => EventSummary::unknown(),
    };

    let payment_status = if row.payment_id.is_some() {
        "completed"
    } else {
        "pending"
    };

    let notes = row
        .item_addons
        .as_ref()
        .and_then(|addons| serde_json::to_string(addons).ok());

    AdminOrderSummary {
        id: row.id,
        created_at: row.created_at,
        updated_at: row.created_at,
        customer: CustomerDetails {
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            city: row.city,
            pincode: row.pincode,
            state: row.state,
        },
        event,
        payment_method: row.payment_method,
        payment_status: payment_status.to_string(),
        order_status: row.status,
        selected_date: row.item_selected_date,
        selected_time: row.item_selected_time,
        total_amount: row.total_amount,
        notes,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use everwish_core::ExperienceId;

    fn sample_row() -> AdminOrderRow {
        AdminOrderRow {
            id: OrderId::generate(),
            user_id: UserId::generate(),
            payment_id: None,
            payment_method: "cod".to_string(),
            status: OrderStatus::Confirmed,
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9999999999".to_string(),
            address: "12 Lake Rd".to_string(),
            city: "Delhi".to_string(),
            pincode: "110001".to_string(),
            state: "DL".to_string(),
            total_amount: Decimal::new(129900, 2),
            created_at: Utc::now(),
            item_unit_price: Some(Decimal::new(64950, 2)),
            item_selected_date: None,
            item_selected_time: Some("18:00".to_string()),
            item_addons: Some(vec!["candles".to_string()]),
            experience_id: Some(ExperienceId::generate()),
            experience_title: Some("Rooftop Dinner".to_string()),
            experience_category: Some("dining".to_string()),
            experience_images: Some(vec!["https://cdn.test/a.jpg".to_string()]),
        }
    }

    #[test]
    fn test_summarize_uses_first_item_event() {
        let summary = summarize(sample_row());
        assert_eq!(summary.event.title, "Rooftop Dinner");
        assert_eq!(summary.event.price, Decimal::new(64950, 2));
        assert_eq!(summary.event.image, "https://cdn.test/a.jpg");
        assert_eq!(summary.payment_status, "pending");
        assert_eq!(summary.notes.as_deref(), Some("[\"candles\"]"));
    }

    #[test]
    fn test_summarize_itemless_order_gets_placeholder() {
        let row = AdminOrderRow {
            experience_id: None,
            experience_title: None,
            experience_category: None,
            experience_images: None,
            item_unit_price: None,
            item_addons: None,
            ..sample_row()
        };
        let summary = summarize(row);
        assert_eq!(summary.event.title, "Unknown Event");
        assert_eq!(summary.event.price, Decimal::ZERO);
        assert!(summary.notes.is_none());
    }

    #[test]
    fn test_paid_order_reports_completed_payment() {
        let row = AdminOrderRow {
            payment_id: Some("pay_123".to_string()),
            ..sample_row()
        };
        assert_eq!(summarize(row).payment_status, "completed");
    }
}
