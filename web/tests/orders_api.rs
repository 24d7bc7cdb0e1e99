//! HTTP tests for the orders API against the in-memory repository.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use axum::http::StatusCode;
use axum_test::TestServer;
use retrofun_core::repository::RepositoryError;
use retrofun_testing::{InMemoryOrderRepository, sample_catalog};
use retrofun_web::handlers::health::{HealthResponse, ReadinessResponse};
use retrofun_web::{AppState, CORRELATION_ID_HEADER, build_router};
use serde_json::Value;

fn server_with(repo: InMemoryOrderRepository) -> TestServer {
    TestServer::new(build_router(AppState::new(repo))).expect("Failed to start test server")
}

fn sample_server() -> TestServer {
    server_with(sample_catalog().into_repository())
}

fn customer_names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["customer"]["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_without_parameters() {
    let server = sample_server();

    let response = server.get("/api/orders").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["total"], 4);
    assert_eq!(
        customer_names(&body),
        vec!["Carol", "Dave", "Carol", "Alice"]
    );
}

#[tokio::test]
async fn test_row_shape() {
    let server = sample_server();

    let body: Value = server
        .get("/api/orders")
        .add_query_param("search", "Alice")
        .await
        .json();

    let row = &body["data"][0];
    let mut keys: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["customer", "id", "order_items", "timestamp", "total"]);

    assert_eq!(row["timestamp"], "2024-03-01T12:00:00Z");
    assert_eq!(row["total"], 25.0);
    assert_eq!(row["id"].as_str().unwrap().len(), 36);
    assert_eq!(row["customer"]["id"].as_str().unwrap().len(), 32);
    assert_eq!(row["customer"]["address"], "Alice Street 1");
    assert_eq!(row["customer"]["phone"], Value::Null);

    let item = &row["order_items"][0];
    assert_eq!(item["quantity"], 2);
    assert_eq!(item["unit_price"], 10.0);
    assert_eq!(item["product"]["name"], "Zed");
    assert_eq!(item["product"]["manufacturer"]["name"], "Acme");
    assert_eq!(item["product"]["year"], 1985);
    assert_eq!(item["product"]["cpu"], Value::Null);
    assert_eq!(item["product"]["countries"], serde_json::json!([]));
}

#[tokio::test]
async fn test_search_by_customer_and_product() {
    let server = sample_server();

    let by_customer: Value = server
        .get("/api/orders")
        .add_query_param("search", "Alice")
        .await
        .json();
    let by_product: Value = server
        .get("/api/orders")
        .add_query_param("search", "Zed")
        .await
        .json();
    let nobody: Value = server
        .get("/api/orders")
        .add_query_param("search", "Bob")
        .await
        .json();

    assert_eq!(by_customer["total"], 1);
    assert_eq!(by_customer["data"][0]["total"], 25.0);
    assert_eq!(by_product["data"][0]["id"], by_customer["data"][0]["id"]);
    assert_eq!(by_product["data"][0]["total"], 25.0);
    assert_eq!(nobody, serde_json::json!({"data": [], "total": 0}));
}

#[tokio::test]
async fn test_sort_and_window() {
    let server = sample_server();

    let body: Value = server
        .get("/api/orders")
        .add_query_param("sort", "-total,+customer")
        .add_query_param("start", "1")
        .add_query_param("length", "2")
        .await
        .json();

    assert_eq!(body["total"], 4);
    assert_eq!(customer_names(&body), vec!["Carol", "Carol"]);
    assert_eq!(body["data"][0]["total"], 150.0);
    assert_eq!(body["data"][1]["total"], 100.0);
}

#[tokio::test]
async fn test_unencoded_plus_sorts_ascending() {
    let server = sample_server();

    // A literal `+` in a query string decodes to a space
    let response = server.get("/api/orders?sort=+total").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["data"][0]["total"], 25.0);
}

#[tokio::test]
async fn test_empty_parameters_use_defaults() {
    let server = sample_server();

    let response = server
        .get("/api/orders?search=&start=&length=&sort=")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["total"], 4);
}

#[tokio::test]
async fn test_invalid_parameters_are_rejected() {
    let server = sample_server();

    for (name, value, message) in [
        ("sort", "+bogus", "invalid sort field \"bogus\""),
        ("sort", "-status", "invalid sort field \"status\""),
        ("sort", "total,,id", "malformed sort token"),
        ("start", "-1", "invalid start"),
        ("start", "ten", "invalid start"),
        ("length", "0", "invalid length"),
    ] {
        let response = server.get("/api/orders").add_query_param(name, value).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{name}={value}");

        let body: Value = response.json();
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(
            body["message"].as_str().unwrap().contains(message),
            "{name}={value}: {body}"
        );
    }
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let repo = sample_catalog().into_repository();
    repo.fail_with(RepositoryError::Storage("connection refused".to_string()));
    let server = server_with(repo.clone());

    let response = server.get("/api/orders").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert!(!body["message"].as_str().unwrap().contains("refused"));

    // Invalid input is rejected before storage is reached
    let rejected = server
        .get("/api/orders")
        .add_query_param("sort", "status")
        .await;
    assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_readiness() {
    let repo = InMemoryOrderRepository::new();
    let server = server_with(repo.clone());

    let health: HealthResponse = server.get("/health").await.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));

    let ready = server.get("/ready").await;
    assert_eq!(ready.status_code(), StatusCode::OK);
    let body: ReadinessResponse = ready.json();
    assert!(body.ready && body.database);

    repo.fail_with(RepositoryError::Storage("down".to_string()));
    let not_ready = server.get("/ready").await;
    assert_eq!(not_ready.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: ReadinessResponse = not_ready.json();
    assert!(!body.ready && !body.database);
}

#[tokio::test]
async fn test_correlation_id_echoed() {
    let server = sample_server();
    let sent = "6f1c1c1e-5d0b-4d7c-9f0b-3f5b8f6f2a10";

    let response = server
        .get("/api/orders")
        .add_header(
            CORRELATION_ID_HEADER.parse::<axum::http::HeaderName>().unwrap(),
            sent.parse::<axum::http::HeaderValue>().unwrap(),
        )
        .await;

    assert_eq!(response.header(CORRELATION_ID_HEADER), sent);
}
