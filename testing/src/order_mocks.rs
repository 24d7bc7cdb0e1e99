//! In-memory order repository.
//!
//! [`InMemoryOrderRepository`] answers listing queries over a `Vec<Order>`
//! with the same matching, totals, sorting and pagination rules as the
//! `PostgreSQL` repository, so handler tests run without a database.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use retrofun_core::entity::Order;
use retrofun_core::listing::{OrderListQuery, SortDirection, SortField, SortKey};
use retrofun_core::repository::{
    OrderListing, OrderPage, OrderRepository, RepositoryError, Result,
};
use std::cmp::Ordering;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

/// In-memory order repository for fast, deterministic handler tests.
///
/// Clones share the same underlying orders.
///
/// # Example
///
/// ```
/// use retrofun_core::listing::OrderListQuery;
/// use retrofun_core::repository::OrderRepository;
/// use retrofun_testing::sample_catalog;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = sample_catalog().into_repository();
///
/// let page = repo
///     .list_orders(&OrderListQuery::new().with_search("alice"))
///     .await?;
/// assert_eq!(page.total, 1);
/// assert_eq!(page.data[0].total, 25.0);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<Vec<Order>>>,
    failure: Arc<RwLock<Option<RepositoryError>>>,
}

impl InMemoryOrderRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `orders`.
    #[must_use]
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(RwLock::new(orders)),
            failure: Arc::default(),
        }
    }

    /// Add an order.
    pub fn insert(&self, order: Order) {
        self.orders.write().unwrap().push(order);
    }

    /// Remove all orders (for test isolation).
    pub fn clear(&self) {
        self.orders.write().unwrap().clear();
    }

    /// Number of stored orders, including ones without items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.read().unwrap().len()
    }

    /// Check if the repository holds no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.read().unwrap().is_empty()
    }

    /// Make every subsequent call fail with `error`, simulating an outage.
    pub fn fail_with(&self, error: RepositoryError) {
        *self.failure.write().unwrap() = Some(error);
    }

    /// Undo [`Self::fail_with`].
    pub fn recover(&self) {
        *self.failure.write().unwrap() = None;
    }

    fn check_failure(&self) -> Result<()> {
        self.failure.read().unwrap().clone().map_or(Ok(()), Err)
    }

    fn page(&self, query: &OrderListQuery) -> OrderPage {
        let orders = self.orders.read().unwrap();

        let mut matching: Vec<OrderListing> = orders
            .iter()
            .filter(|order| !order.order_items.is_empty() && matches(query, order))
            .cloned()
            .map(OrderListing::from)
            .collect();

        let keys = query.effective_sort();
        matching.sort_by(|a, b| compare(&keys, a, b));

        let total = matching.len() as u64;
        let start = usize::try_from(query.start()).unwrap_or(usize::MAX);
        let length = query
            .length()
            .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));

        let data = matching.into_iter().skip(start).take(length).collect();
        OrderPage { data, total }
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn list_orders<'a>(
        &'a self,
        query: &'a OrderListQuery,
    ) -> Pin<Box<dyn Future<Output = Result<OrderPage>> + Send + 'a>> {
        Box::pin(async move {
            self.check_failure()?;
            Ok(self.page(query))
        })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { self.check_failure() })
    }
}

fn matches(query: &OrderListQuery, order: &Order) -> bool {
    query.search_matches(&order.customer.name)
        || order
            .order_items
            .iter()
            .any(|item| query.search_matches(&item.product.name))
}

fn compare(keys: &[SortKey], a: &OrderListing, b: &OrderListing) -> Ordering {
    keys.iter()
        .map(|key| {
            let ordering = match key.field {
                SortField::Customer => a.order.customer.name.cmp(&b.order.customer.name),
                SortField::Total => a.total.total_cmp(&b.total),
                SortField::Timestamp => a.order.timestamp.cmp(&b.order.timestamp),
                SortField::Id => a.order.id.as_uuid().cmp(b.order.id.as_uuid()),
            };
            match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_catalog;
    use retrofun_core::listing::parse_sort;

    fn block_on<F: Future>(future: F) -> F::Output {
        tokio_test::block_on(future)
    }

    fn customers(page: &OrderPage) -> Vec<&str> {
        page.data
            .iter()
            .map(|row| row.order.customer.name.as_str())
            .collect()
    }

    #[test]
    fn test_default_sort_is_newest_first_without_empty_orders() {
        let repo = sample_catalog().into_repository();
        let page = block_on(repo.list_orders(&OrderListQuery::new())).unwrap();

        assert_eq!(repo.len(), 5);
        assert_eq!(page.total, 4);
        assert_eq!(customers(&page), vec!["Carol", "Dave", "Carol", "Alice"]);
    }

    #[test]
    fn test_search_by_product_keeps_full_total() {
        let repo = sample_catalog().into_repository();
        let query = OrderListQuery::new().with_search("zed");
        let page = block_on(repo.list_orders(&query)).unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].order.order_items.len(), 2);
        assert!((page.data[0].total - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_multi_key_sort() {
        let repo = sample_catalog().into_repository();
        let query = OrderListQuery::new().with_sort(parse_sort("+customer,-total").unwrap());
        let page = block_on(repo.list_orders(&query)).unwrap();

        assert_eq!(customers(&page), vec!["Alice", "Carol", "Carol", "Dave"]);
        assert!(page.data[1].total > page.data[2].total);
    }

    #[test]
    fn test_window_past_the_end() {
        let repo = sample_catalog().into_repository();
        let query = OrderListQuery::new().with_start(10).with_length(5);
        let page = block_on(repo.list_orders(&query)).unwrap();

        assert!(page.data.is_empty());
        assert_eq!(page.total, 4);
    }

    #[test]
    fn test_injected_failure() {
        let repo = InMemoryOrderRepository::new();
        repo.fail_with(RepositoryError::Storage("connection refused".to_string()));

        assert!(block_on(repo.ping()).is_err());
        assert!(block_on(repo.list_orders(&OrderListQuery::new())).is_err());

        repo.recover();
        assert!(block_on(repo.ping()).is_ok());
    }
}
