//! Order listing endpoint.

use crate::WebResult;
use crate::error::AppError;
use crate::middleware::CorrelationId;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use retrofun_core::listing::{OrderListParams, OrderListQuery};
use retrofun_core::repository::OrderPage;
use std::time::Instant;

/// List orders.
///
/// ```text
/// GET /api/orders?search=<text>&start=<offset>&length=<count>&sort=<-total,+customer>
/// ```
///
/// Parameters are validated before storage is touched; any invalid value is a
/// `400 BAD_REQUEST`. The response is `{"data": [...], "total": <count>}`
/// where `total` counts every matching order regardless of the window.
///
/// # Errors
///
/// - [`AppError::bad_request`] for an unparsable query string, bad `start`/`length`,
///   or an unknown or malformed sort token
/// - [`AppError::internal`] if storage fails
pub async fn list_orders(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    params: Result<Query<OrderListParams>, QueryRejection>,
) -> WebResult<Json<OrderPage>> {
    let started = Instant::now();
    metrics::counter!("orders.list.requests").increment(1);

    let query = params
        .map_err(AppError::from)
        .and_then(|Query(params)| OrderListQuery::try_from(params).map_err(AppError::from))
        .inspect_err(|_| metrics::counter!("orders.list.rejected").increment(1))?;

    let page = state.orders.list_orders(&query).await?;

    metrics::histogram!("orders.list.duration_seconds").record(started.elapsed().as_secs_f64());
    tracing::info!(
        %correlation_id,
        search = query.search(),
        start = query.start(),
        length = query.length(),
        rows = page.data.len(),
        total = page.total,
        "Listed orders"
    );

    Ok(Json(page))
}
