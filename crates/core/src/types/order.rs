//! Order records as exchanged with the remote API.
//!
//! Line items are snapshots: they copy name, quantity and price at submission
//! time so later catalog edits do not rewrite order history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MissingIdError, resolve_id};
use super::{OrderId, OrderStatus, Price};

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product name at submission time.
    pub name: String,
    /// Quantity ordered.
    pub qty: u32,
    /// Unit price at submission time.
    pub price: Price,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.price.times(self.qty)
    }
}

/// Request body for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Who placed the order.
    pub customer_name: String,
    /// Snapshot of the cart lines.
    pub items: Vec<OrderItem>,
    /// Sum of the item subtotals.
    pub total_price: Price,
    /// Always [`OrderStatus::New`] for a fresh checkout.
    pub status: OrderStatus,
}

/// An order as stored by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "OrderRecord")]
pub struct Order {
    /// Server-assigned identifier (sent as `_id`, `id` or both by the API).
    pub id: OrderId,
    /// Who placed the order.
    pub customer_name: String,
    /// Snapshot of the ordered items.
    pub items: Vec<OrderItem>,
    /// Order total.
    pub total_price: Price,
    /// Processing status.
    pub status: OrderStatus,
    /// Creation time, if the API reports it.
    pub created_at: Option<DateTime<Utc>>,
}

/// Wire shape of an [`Order`] before its identifier is resolved.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRecord {
    #[serde(rename = "_id")]
    underscore_id: Option<OrderId>,
    id: Option<OrderId>,
    #[serde(default)]
    customer_name: String,
    #[serde(default)]
    items: Vec<OrderItem>,
    total_price: Price,
    #[serde(default)]
    status: OrderStatus,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = MissingIdError;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: resolve_id(record.underscore_id, record.id)?,
            customer_name: record.customer_name,
            items: record.items,
            total_price: record.total_price,
            status: record.status,
            created_at: record.created_at,
        })
    }
}

impl Order {
    /// Short human-friendly reference; see [`OrderId::short_reference`].
    #[must_use]
    pub fn short_reference(&self) -> String {
        self.id.short_reference()
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.qty))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_wire_format() {
        let order = NewOrder {
            customer_name: "Budi".to_string(),
            items: vec![OrderItem {
                name: "Kopi Arabika Gayo".to_string(),
                qty: 2,
                price: Price::new(75000),
            }],
            total_price: Price::new(150_000),
            status: OrderStatus::New,
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "customerName": "Budi",
                "items": [{"name": "Kopi Arabika Gayo", "qty": 2, "price": 75000}],
                "totalPrice": 150000,
                "status": "Baru"
            })
        );
    }

    #[test]
    fn test_order_from_api_response() {
        let json = r#"{
            "_id": "65f0c2a9e1b3abc123ef99",
            "customerName": "Budi",
            "items": [{"name": "Sambal Roa Botol", "qty": 3, "price": 35000}],
            "totalPrice": 105000,
            "status": "Proses",
            "createdAt": "2024-03-12T08:30:00.000Z"
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id.as_str(), "65f0c2a9e1b3abc123ef99");
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.short_reference(), "3EF99");
        assert_eq!(order.item_count(), 3);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_order_tolerates_missing_optional_fields() {
        let json = r#"{"id": "abc", "totalPrice": 0}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::New);
        assert!(order.items.is_empty());
        assert!(order.created_at.is_none());
    }

    #[test]
    fn test_order_with_both_id_keys() {
        let json = r#"{
            "_id": "65f0c2a9e1b3abc123ef99",
            "id": "65f0c2a9e1b3abc123ef99",
            "customerName": "Budi",
            "items": [],
            "totalPrice": 105000,
            "status": "Baru"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id.as_str(), "65f0c2a9e1b3abc123ef99");

        let json = r#"{"_id": "from-store", "id": "virtual", "totalPrice": 0}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id.as_str(), "from-store");
    }

    #[test]
    fn test_order_without_id_is_rejected() {
        let err = serde_json::from_str::<Order>(r#"{"totalPrice": 0}"#).unwrap_err();
        assert!(err.to_string().contains("neither `_id` nor `id`"));
    }

    #[test]
    fn test_item_subtotal() {
        let item = OrderItem {
            name: "Keripik".to_string(),
            qty: 2,
            price: Price::new(15000),
        };
        assert_eq!(item.subtotal(), Price::new(30000));
    }
}
