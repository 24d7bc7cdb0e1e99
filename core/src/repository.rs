//! Storage seam for the order listing.
//!
//! The HTTP layer depends only on [`OrderRepository`]. Production wires in the
//! `PostgreSQL` implementation from `retrofun-postgres`; handler tests use the
//! in-memory one from `retrofun-testing`. Both must agree on the listing
//! semantics:
//!
//! - an order matches when its customer name or any of its product names
//!   contains the search term (case-insensitive)
//! - orders without line items never appear
//! - every matching order appears once, with `total` summed over all its items
//! - rows are ordered by [`OrderListQuery::effective_sort`], then paginated
//! - [`OrderPage::total`] counts every match, ignoring pagination

use crate::entity::Order;
use crate::listing::OrderListQuery;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Error type for storage operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    /// Connection, transaction or SQL failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// A row did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// One row of the order listing: the fully loaded order plus its total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderListing {
    /// The order with its customer and line items
    #[serde(flatten)]
    pub order: Order,
    /// `sum(unit_price * quantity)` over all the order's items
    pub total: f64,
}

impl From<Order> for OrderListing {
    fn from(order: Order) -> Self {
        let total = order.total();
        Self { order, total }
    }
}

/// A page of the order listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    /// Matching orders in the requested window
    pub data: Vec<OrderListing>,
    /// Number of matching orders across all pages
    pub total: u64,
}

/// Read access to orders.
///
/// Uses explicit `Pin<Box<dyn Future>>` returns so the repository can be
/// shared as `Arc<dyn OrderRepository>` in HTTP state.
pub trait OrderRepository: Send + Sync {
    /// Fetch one page of matching orders plus the total match count.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if storage fails or returns malformed rows.
    fn list_orders<'a>(
        &'a self,
        query: &'a OrderListQuery,
    ) -> Pin<Box<dyn Future<Output = Result<OrderPage>> + Send + 'a>>;

    /// Check that storage is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] if storage cannot be reached.
    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests can unwrap
mod tests {
    use super::*;
    use crate::entity::{Customer, CustomerId, OrderId};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_listing_flattens_order_next_to_total() {
        let order = Order {
            id: OrderId::new(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            customer: Customer {
                id: CustomerId::new(),
                name: "Alice".to_string(),
                address: Some("1 Main St".to_string()),
                phone: None,
            },
            order_items: vec![],
        };

        let json = serde_json::to_value(OrderListing::from(order)).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(
            object.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["customer", "id", "order_items", "timestamp", "total"]
        );
        assert_eq!(json["timestamp"], "2024-03-01T12:00:00Z");
        assert_eq!(json["customer"]["name"], "Alice");
        assert_eq!(json["total"], 0.0);
    }

    #[test]
    fn test_error_display() {
        let err = RepositoryError::Storage("connection refused".to_string());
        assert_eq!(err.to_string(), "Storage error: connection refused");
    }
}
