//! Axum HTTP layer for the `RetroFun` orders backend.
//!
//! The shell is thin: handlers parse request parameters into typed queries
//! from `retrofun-core`, hand them to the [`OrderRepository`](retrofun_core::repository::OrderRepository)
//! in [`AppState`], and serialize the result.
//!
//! # Request Flow
//!
//! 1. **Correlation ID** is read from `X-Correlation-ID` or generated
//! 2. **Query string** is deserialized into `OrderListParams`
//! 3. **Validation** turns it into an `OrderListQuery` (or a 400)
//! 4. **Repository** loads the page and the match count
//! 5. **Response** is serialized as `{"data": [...], "total": n}`
//!
//! # Example
//!
//! ```
//! use retrofun_testing::sample_catalog;
//! use retrofun_web::{AppState, build_router};
//!
//! let app = build_router(AppState::new(sample_catalog().into_repository()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use middleware::{CORRELATION_ID_HEADER, CorrelationId, correlation_id_layer};
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
