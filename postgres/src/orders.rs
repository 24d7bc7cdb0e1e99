//! `PostgreSQL` order repository.
//!
//! A listing request runs two statements inside one read-only
//! `REPEATABLE READ` transaction, so the page and the match count see the same
//! snapshot:
//!
//! 1. the page query, which loads each order with its customer, items,
//!    products, manufacturers and countries in a single round trip
//!    (items and countries are aggregated to JSON per order)
//! 2. the count query, which counts distinct matching orders
//!
//! The search predicate runs against grouped rows (`HAVING ... bool_or(...)`)
//! in the page query, so an order matched through one product still reports
//! the total of all its items.

use chrono::{DateTime, Utc};
use retrofun_core::entity::{Customer, CustomerId, Order, OrderId, OrderItem};
use retrofun_core::listing::{OrderListQuery, SortField, SortKey};
use retrofun_core::repository::{OrderListing, OrderPage, OrderRepository, RepositoryError, Result};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use uuid::Uuid;

const PAGE_SELECT: &str = r"SELECT o.id AS order_id, o.timestamp AS placed_at,
    c.id AS customer_id, c.name AS customer_name,
    c.address AS customer_address, c.phone AS customer_phone,
    SUM(oi.unit_price * oi.quantity) AS total,
    json_agg(json_build_object(
        'product', json_build_object(
            'id', p.id,
            'name', p.name,
            'manufacturer', json_build_object('id', m.id, 'name', m.name),
            'year', p.year,
            'cpu', p.cpu,
            'countries', COALESCE(pcs.countries, '[]'::json)
        ),
        'quantity', oi.quantity,
        'unit_price', oi.unit_price
    ) ORDER BY p.id) AS order_items";

const COUNT_SELECT: &str = "SELECT COUNT(DISTINCT o.id)";

const FROM_JOINS: &str = r"
FROM orders o
JOIN customers c ON c.id = o.customer_id
JOIN orders_items oi ON oi.order_id = o.id
JOIN products p ON p.id = oi.product_id
JOIN manufacturers m ON m.id = p.manufacturer_id
LEFT JOIN (
    SELECT pc.product_id,
        json_agg(json_build_object('id', co.id, 'name', co.name) ORDER BY co.id) AS countries
    FROM product_countries pc
    JOIN countries co ON co.id = pc.country_id
    GROUP BY pc.product_id
) pcs ON pcs.product_id = p.id";

/// Reads orders from `PostgreSQL`.
///
/// # Example
///
/// ```no_run
/// use retrofun_core::listing::OrderListQuery;
/// use retrofun_core::repository::OrderRepository;
/// use retrofun_postgres::PostgresOrderRepository;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let orders = PostgresOrderRepository::new(pool);
/// let page = orders
///     .list_orders(&OrderListQuery::new().with_search("amiga").with_length(10))
///     .await?;
/// println!("{} of {} orders", page.data.len(), page.total);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Create a repository over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[tracing::instrument(
        skip(self, query),
        name = "list_orders",
        fields(search = query.search(), start = query.start(), length = query.length())
    )]
    async fn fetch_page(&self, query: &OrderListQuery) -> Result<OrderPage> {
        let started = Instant::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage("begin transaction", &e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| storage("set transaction mode", &e))?;

        let rows: Vec<OrderRow> = page_query(query)
            .build_query_as()
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| storage("load order page", &e))?;

        let (count,): (i64,) = count_query(query)
            .build_query_as()
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| storage("count orders", &e))?;

        tx.commit()
            .await
            .map_err(|e| storage("commit transaction", &e))?;

        let total = u64::try_from(count)
            .map_err(|_| RepositoryError::Decode(format!("negative order count {count}")))?;
        let data: Vec<OrderListing> = rows.into_iter().map(OrderListing::from).collect();

        metrics::histogram!("orders.query.duration_seconds")
            .record(started.elapsed().as_secs_f64());

        tracing::debug!(rows = data.len(), total, "Loaded order page");

        Ok(OrderPage { data, total })
    }
}

impl OrderRepository for PostgresOrderRepository {
    fn list_orders<'a>(
        &'a self,
        query: &'a OrderListQuery,
    ) -> Pin<Box<dyn Future<Output = Result<OrderPage>> + Send + 'a>> {
        Box::pin(self.fetch_page(query))
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| storage("ping", &e))?;
            Ok(())
        })
    }
}

/// One order as returned by the page query.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: Uuid,
    placed_at: DateTime<Utc>,
    customer_id: Uuid,
    customer_name: String,
    customer_address: Option<String>,
    customer_phone: Option<String>,
    total: f64,
    order_items: Json<Vec<OrderItem>>,
}

impl From<OrderRow> for OrderListing {
    fn from(row: OrderRow) -> Self {
        Self {
            order: Order {
                id: OrderId::from_uuid(row.order_id),
                timestamp: row.placed_at,
                customer: Customer {
                    id: CustomerId::from_uuid(row.customer_id),
                    name: row.customer_name,
                    address: row.customer_address,
                    phone: row.customer_phone,
                },
                order_items: row.order_items.0,
            },
            total: row.total,
        }
    }
}

/// Build the page query: matching orders, sorted and windowed.
fn page_query(query: &OrderListQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(PAGE_SELECT);
    builder.push(FROM_JOINS);
    builder.push("\nGROUP BY o.id, c.id");

    if let Some(pattern) = query.search_pattern() {
        builder.push("\nHAVING c.name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR bool_or(p.name ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    builder.push("\nORDER BY ");
    let mut keys = builder.separated(", ");
    for key in query.effective_sort() {
        keys.push(order_by(key));
    }

    builder.push("\nOFFSET ");
    builder.push_bind(as_bigint(query.start()));
    if let Some(length) = query.length() {
        builder.push(" LIMIT ");
        builder.push_bind(as_bigint(length));
    }

    builder
}

/// Build the count query: distinct matching orders, ignoring the window.
fn count_query(query: &OrderListQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(COUNT_SELECT);
    builder.push(FROM_JOINS);

    if let Some(pattern) = query.search_pattern() {
        builder.push("\nWHERE c.name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR p.name ILIKE ");
        builder.push_bind(pattern);
    }

    builder
}

/// `ORDER BY` term for a sort key. Only whitelisted expressions reach SQL.
fn order_by(key: SortKey) -> String {
    let column = match key.field {
        SortField::Customer => "c.name",
        SortField::Total => "total",
        SortField::Timestamp => "o.timestamp",
        SortField::Id => "o.id",
    };
    format!("{column} {}", key.direction.as_sql())
}

fn as_bigint(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn storage(operation: &str, error: &sqlx::Error) -> RepositoryError {
    tracing::warn!(operation, error = %error, "Order query failed");
    match error {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RepositoryError::Decode(format!("{operation}: {error}"))
        }
        _ => RepositoryError::Storage(format!("{operation}: {error}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrofun_core::listing::parse_sort;

    fn tail(sql: &str) -> &str {
        sql.rsplit("GROUP BY").next().unwrap_or_default()
    }

    #[test]
    fn test_page_query_default_sort_and_no_filter() {
        let builder = page_query(&OrderListQuery::new());
        let sql = builder.sql();

        assert!(sql.starts_with("SELECT o.id AS order_id"));
        assert!(!sql.contains("HAVING"));
        assert_eq!(
            tail(sql),
            " o.id, c.id\nORDER BY o.timestamp DESC, o.id ASC\nOFFSET $1"
        );
    }

    #[test]
    fn test_page_query_with_search_and_window() {
        let query = OrderListQuery::new()
            .with_search("amiga")
            .with_start(20)
            .with_length(10);
        let builder = page_query(&query);

        assert_eq!(
            tail(builder.sql()),
            " o.id, c.id\nHAVING c.name ILIKE $1 OR bool_or(p.name ILIKE $2)\n\
             ORDER BY o.timestamp DESC, o.id ASC\nOFFSET $3 LIMIT $4"
        );
    }

    #[test]
    fn test_page_query_multi_key_sort() {
        let keys = parse_sort("-total,+customer").unwrap_or_default();
        let builder = page_query(&OrderListQuery::new().with_sort(keys));

        assert!(
            builder
                .sql()
                .contains("ORDER BY total DESC, c.name ASC, o.id ASC")
        );
    }

    #[test]
    fn test_page_query_keeps_explicit_id_key() {
        let keys = parse_sort("-id").unwrap_or_default();
        let builder = page_query(&OrderListQuery::new().with_sort(keys));

        assert!(builder.sql().contains("ORDER BY o.id DESC\nOFFSET"));
    }

    #[test]
    fn test_count_query_filters_rows() {
        let plain = count_query(&OrderListQuery::new());
        assert!(plain.sql().starts_with("SELECT COUNT(DISTINCT o.id)"));
        assert!(!plain.sql().contains("WHERE"));

        let filtered = count_query(&OrderListQuery::new().with_search("zed"));
        assert!(
            filtered
                .sql()
                .ends_with("\nWHERE c.name ILIKE $1 OR p.name ILIKE $2")
        );
    }

    #[test]
    fn test_both_queries_join_the_same_tables() {
        let page = page_query(&OrderListQuery::new());
        let count = count_query(&OrderListQuery::new());

        assert!(page.sql().contains(FROM_JOINS));
        assert!(count.sql().contains(FROM_JOINS));
    }

    #[test]
    fn test_window_values_saturate() {
        assert_eq!(as_bigint(0), 0);
        assert_eq!(as_bigint(u64::MAX), i64::MAX);
    }
}
