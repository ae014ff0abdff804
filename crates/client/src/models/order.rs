//! Orders and the checkout handoff payloads.

use cartwheel_core::{OrderId, OrderStatus, Price, ProductId};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Product;

/// One line sent to the payment provider and to order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

/// Where to send the shopper to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub url: String,
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
}

/// Checkout state written before leaving for the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCheckout {
    #[serde(default)]
    pub session_id: Option<String>,
    pub items: Vec<CheckoutItem>,
    pub created_at: DateTime<Utc>,
}

/// An order recorded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub total_price: Option<Price>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

impl Order {
    /// Order total, falling back to summing the lines when the backend
    /// omitted it.
    #[must_use]
    pub fn total(&self) -> Price {
        self.total_price.unwrap_or_else(|| {
            self.order_items
                .iter()
                .map(|item| item.price.times(item.quantity))
                .sum()
        })
    }
}

/// One line of a recorded order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: u32,
    pub price: Price,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_item_wire_names() {
        let item = CheckoutItem {
            product_id: ProductId::new(4),
            name: "Lamp".to_string(),
            price: Price::parse("20").unwrap(),
            quantity: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productId"], 4);
        assert_eq!(json["quantity"], 2);
    }

    #[test]
    fn test_redirect_reads_session_id() {
        let redirect: CheckoutRedirect =
            serde_json::from_str(r#"{"url":"https://pay.test/c/1","sessionID":"cs_1"}"#).unwrap();
        assert_eq!(redirect.session_id.as_deref(), Some("cs_1"));
    }

    #[test]
    fn test_order_total_falls_back_to_lines() {
        let json = r#"{
            "id": 8,
            "status": "COMPLETED",
            "createdAt": "2025-12-01T10:00:00.123",
            "orderItems": [
                {"quantity": 2, "price": 10},
                {"quantity": 1, "price": 5.25}
            ]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.total(), Price::parse("25.25").unwrap());
    }
}
