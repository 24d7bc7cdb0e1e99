//! Application state for Axum handlers.

use retrofun_core::repository::OrderRepository;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Holds the order repository behind a trait object so the same router runs
/// against `PostgreSQL` in production and in-memory storage in tests.
#[derive(Clone)]
pub struct AppState {
    /// Order storage
    pub orders: Arc<dyn OrderRepository>,
}

impl AppState {
    /// Create application state over `orders`.
    #[must_use]
    pub fn new(orders: impl OrderRepository + 'static) -> Self {
        Self {
            orders: Arc::new(orders),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
