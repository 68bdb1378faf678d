//! Order header, order item, and checkout request types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use everwish_core::{ExperienceId, OrderId, OrderItemId, OrderStatus, UserId};

/// Shipping/contact details captured at checkout.
///
/// Serialized camelCase to match the storefront client payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub state: String,
}

/// Request body for `POST /api/orders`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer: Option<CustomerDetails>,
    pub payment_method: Option<String>,
    /// Overrides per-line selected dates when provided.
    pub selected_date: Option<NaiveDate>,
    /// Overrides per-line selected times when provided.
    pub selected_time: Option<String>,
}

/// An immutable order header created at checkout.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
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
}

/// One row per cart line at order time; never mutated afterwards.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub experience_id: ExperienceId,
    pub quantity: i32,
    /// Copied from the cart snapshot, not looked up live.
    pub unit_price: Decimal,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub addons: Vec<String>,
}

/// A placed order together with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Representative event shown on the admin order listing.
///
/// Derived from the first order item only; multi-item orders collapse to
/// their first line on this view.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub price: Decimal,
    pub image: String,
}

impl EventSummary {
    /// Placeholder for orders whose items (or experience) are gone.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            id: "unknown".to_string(),
            title: "Unknown Event".to_string(),
            category: "Unknown".to_string(),
            price: Decimal::ZERO,
            image: "/placeholder.svg".to_string(),
        }
    }
}

/// Flattened order summary for the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderSummary {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer: CustomerDetails,
    pub event: EventSummary,
    pub payment_method: String,
    pub payment_status: String,
    pub order_status: OrderStatus,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub total_amount: Decimal,
    pub notes: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_details_camel_case() {
        let json = r#"{
            "firstName": "Asha",
            "lastName": "Rao",
            "email": "asha@example.com",
            "phone": "9999999999",
            "address": "12 Lake Rd",
            "city": "Delhi",
            "pincode": "110001",
            "state": "DL"
        }"#;

        let customer: CustomerDetails = serde_json::from_str(json).unwrap();
        assert_eq!(customer.first_name, "Asha");

        let out = serde_json::to_string(&customer).unwrap();
        assert!(out.contains("firstName"));
        assert!(!out.contains("first_name"));
    }

    #[test]
    fn test_unknown_event_placeholder() {
        let event = EventSummary::unknown();
        assert_eq!(event.price, Decimal::ZERO);
        assert_eq!(event.image, "/placeholder.svg");
    }
}
