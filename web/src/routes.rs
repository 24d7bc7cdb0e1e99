//! Router configuration.

use crate::handlers::{health_check, list_orders, readiness_check};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `GET /health`: liveness
/// - `GET /ready`: readiness (pings order storage)
/// - `GET /api/orders`: the order listing
///
/// Every route runs inside the HTTP trace and correlation ID layers.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().route("/orders", get(list_orders));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
