//! Entity model for the catalog and orders.
//!
//! These are the eagerly loaded, serializable shapes of the persisted records.
//! Relationships are embedded rather than referenced: an [`Order`] carries its
//! [`Customer`] and its [`OrderItem`]s, each item carries its full [`Product`],
//! and each product carries its [`Manufacturer`] and [`Country`] list. A listing
//! row can therefore be rendered without any further lookup.
//!
//! The physical schema (tables, keys, indexes, cascades) is declared in
//! `retrofun_postgres::schema`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a customer.
///
/// Serializes as 32 lowercase hex digits without hyphens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// Creates a new random `CustomerId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `CustomerId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl Serialize for CustomerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Unique identifier for an order, generated at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random `OrderId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `OrderId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! serial_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database key
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the raw database key
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

serial_id!(
    /// Identifier of a product (serial key).
    ProductId
);
serial_id!(
    /// Identifier of a manufacturer (serial key).
    ManufacturerId
);
serial_id!(
    /// Identifier of a country (serial key).
    CountryId
);

// ============================================================================
// Catalog
// ============================================================================

/// A hardware manufacturer. Deleting one cascades to its products.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    /// Manufacturer ID
    pub id: ManufacturerId,
    /// Unique name
    pub name: String,
}

/// A country a product was sold in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Country ID
    pub id: CountryId,
    /// Unique name
    pub name: String,
}

/// A catalog product with its manufacturer and countries loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID
    pub id: ProductId,
    /// Unique product name (searched by the order listing)
    pub name: String,
    /// Owning manufacturer
    pub manufacturer: Manufacturer,
    /// Release year
    pub year: i32,
    /// CPU descriptor, when known
    pub cpu: Option<String>,
    /// Countries the product was sold in, ordered by country ID
    pub countries: Vec<Country>,
}

// ============================================================================
// Customers and orders
// ============================================================================

/// A customer account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID
    pub id: CustomerId,
    /// Unique customer name (searched by the order listing)
    pub name: String,
    /// Postal address
    pub address: Option<String>,
    /// Phone number
    pub phone: Option<String>,
}

/// A line item: a product sold within an order at a price snapshot.
///
/// Identity is the (product, order) pair, so a product appears at most once
/// per order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product sold
    pub product: Product,
    /// Units sold
    pub quantity: u32,
    /// Price per unit at purchase time
    pub unit_price: f64,
}

impl OrderItem {
    /// `unit_price * quantity` for this line.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// An order with its customer and line items loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID
    pub id: OrderId,
    /// When the order was placed
    pub timestamp: DateTime<Utc>,
    /// The customer who placed the order
    pub customer: Customer,
    /// Line items, ordered by product ID
    pub order_items: Vec<OrderItem>,
}

impl Order {
    /// Monetary total: `sum(unit_price * quantity)` over all line items.
    ///
    /// Never stored; an order without items totals zero.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.order_items.iter().map(OrderItem::subtotal).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests can unwrap
mod tests {
    use super::*;

    fn product(id: i32, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            manufacturer: Manufacturer {
                id: ManufacturerId::new(1),
                name: "Commodore".to_string(),
            },
            year: 1982,
            cpu: Some("6510".to_string()),
            countries: vec![Country {
                id: CountryId::new(1),
                name: "USA".to_string(),
            }],
        }
    }

    #[test]
    fn test_order_total_sums_line_items() {
        let order = Order {
            id: OrderId::new(),
            timestamp: Utc::now(),
            customer: Customer {
                id: CustomerId::new(),
                name: "Alice".to_string(),
                address: None,
                phone: None,
            },
            order_items: vec![
                OrderItem {
                    product: product(1, "Zed"),
                    quantity: 2,
                    unit_price: 10.0,
                },
                OrderItem {
                    product: product(2, "Amber"),
                    quantity: 1,
                    unit_price: 5.0,
                },
            ],
        };

        assert!((order.total() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_order_without_items_totals_zero() {
        let order = Order {
            id: OrderId::new(),
            timestamp: Utc::now(),
            customer: Customer {
                id: CustomerId::new(),
                name: "Bob".to_string(),
                address: None,
                phone: None,
            },
            order_items: vec![],
        };

        assert!(order.total().abs() < f64::EPSILON);
    }

    #[test]
    fn test_customer_id_serializes_as_simple_hex() {
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let json = serde_json::to_string(&CustomerId::from_uuid(uuid)).unwrap();
        assert_eq!(json, "\"67e5504410b1426f9247bb680e5fe0c8\"");
    }

    #[test]
    fn test_order_id_serializes_hyphenated() {
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let json = serde_json::to_string(&OrderId::from_uuid(uuid)).unwrap();
        assert_eq!(json, "\"67e55044-10b1-426f-9247-bb680e5fe0c8\"");
    }

    #[test]
    fn test_customer_id_deserializes_from_either_form() {
        let simple: CustomerId =
            serde_json::from_str("\"67e5504410b1426f9247bb680e5fe0c8\"").unwrap();
        let hyphenated: CustomerId =
            serde_json::from_str("\"67e55044-10b1-426f-9247-bb680e5fe0c8\"").unwrap();
        assert_eq!(simple, hyphenated);
    }
}
