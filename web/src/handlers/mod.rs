//! HTTP request handlers.

pub mod health;
pub mod orders;

pub use health::{health_check, readiness_check};
pub use orders::list_orders;
