//! # RetroFun Core
//!
//! Entity model and order listing types for the RetroFun catalog-and-orders backend.
//!
//! This crate is the functional core of the workspace. It performs no I/O:
//!
//! - [`entity`]: customers, products, manufacturers, countries, orders and line items
//! - [`listing`]: parsing and validation of the order listing request parameters
//! - [`repository`]: the storage seam the HTTP layer depends on
//!
//! Storage backends live in `retrofun-postgres` (production) and
//! `retrofun-testing` (in-memory). The HTTP surface lives in `retrofun-web`.
//!
//! ## Example
//!
//! ```
//! use retrofun_core::listing::{OrderListParams, OrderListQuery, SortDirection, SortField};
//!
//! let params = OrderListParams {
//!     search: Some("alice".to_string()),
//!     start: Some("0".to_string()),
//!     length: Some("20".to_string()),
//!     sort: Some("-total,+customer".to_string()),
//! };
//!
//! let query = OrderListQuery::try_from(params)?;
//! assert_eq!(query.sort_keys()[0].field, SortField::Total);
//! assert_eq!(query.sort_keys()[0].direction, SortDirection::Descending);
//! # Ok::<(), retrofun_core::listing::ListingError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod entity;
pub mod listing;
pub mod repository;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use entity::{
    Country, CountryId, Customer, CustomerId, Manufacturer, ManufacturerId, Order, OrderId,
    OrderItem, Product, ProductId,
};
pub use listing::{
    ListingError, OrderListParams, OrderListQuery, SortDirection, SortField, SortKey,
};
pub use repository::{OrderListing, OrderPage, OrderRepository, RepositoryError};
