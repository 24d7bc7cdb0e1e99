//! # RetroFun Testing
//!
//! Testing utilities for the `RetroFun` orders backend.
//!
//! This crate provides:
//! - [`InMemoryOrderRepository`]: an [`OrderRepository`](retrofun_core::repository::OrderRepository)
//!   over in-memory orders, with injectable failures
//! - [`Catalog`]: a fixture builder that assigns serial ids like the database does
//! - [`sample_catalog`]: the shared dataset for handler tests
//! - [`properties`]: proptest strategies for listing parameters
//!
//! ## Example
//!
//! ```
//! use retrofun_core::listing::OrderListQuery;
//! use retrofun_core::repository::OrderRepository;
//! use retrofun_testing::sample_catalog;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = sample_catalog().into_repository();
//! let page = repo.list_orders(&OrderListQuery::new().with_length(2)).await?;
//!
//! assert_eq!(page.data.len(), 2);
//! assert_eq!(page.total, 4);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod order_mocks;

/// Proptest strategies for listing parameters.
pub mod properties {
    use proptest::prelude::*;
    use retrofun_core::listing::{SortDirection, SortField, SortKey};

    /// Any sortable field.
    pub fn sort_field() -> impl Strategy<Value = SortField> {
        prop::sample::select(SortField::ALL.to_vec())
    }

    /// Any sort key.
    pub fn sort_key() -> impl Strategy<Value = SortKey> {
        (sort_field(), any::<bool>()).prop_map(|(field, descending)| SortKey {
            field,
            direction: if descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        })
    }

    /// One to four sort keys, duplicates allowed.
    pub fn sort_keys() -> impl Strategy<Value = Vec<SortKey>> {
        prop::collection::vec(sort_key(), 1..=4)
    }
}

pub use fixtures::{Catalog, march, sample_catalog};
pub use order_mocks::InMemoryOrderRepository;
