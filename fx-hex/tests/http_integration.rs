//! HTTP-level tests against an in-memory SQLite repository and the
//! development rate table.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;

use exchange_rates::{RateCache, StaticRateProvider};
use fx_hex::{RateUpdateService, inbound::HttpServer};
use fx_repo::SqliteRepo;

/// Helper to create a router over a fresh database.
async fn create_test_app() -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let cache = Arc::new(RateCache::new(Arc::new(StaticRateProvider::development())));
    let service = Arc::new(RateUpdateService::new(repo, cache));
    HttpServer::new(service).router()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn send_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

async fn add_pair(app: &Router, source: &str, target: &str) {
    let (status, _) = call(
        app,
        send_json(
            Method::POST,
            "/api/pairs",
            json!({ "source": source, "target": target }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_health_reports_last_run() {
    let app = create_test_app().await;

    let (status, body) = call(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["last_run"], "NOT_STARTED");
}

#[tokio::test]
async fn test_cross_rate_endpoint() {
    let app = create_test_app().await;

    let (status, body) = call(&app, get("/api/rates/usd/eur")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"], "USD");
    assert_eq!(body["target"], "EUR");
    assert_eq!(decimal(&body["rate"]), dec!(0.92));
}

#[tokio::test]
async fn test_cross_rate_unknown_currency_is_404() {
    let app = create_test_app().await;

    let (status, body) = call(&app, get("/api/rates/USD/XXX")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_refresh_updates_pairs_with_offsets() {
    let app = create_test_app().await;
    add_pair(&app, "USD", "EUR").await;
    add_pair(&app, "usd", "cad").await;
    add_pair(&app, "USD", "XXX").await;

    let (status, body) = call(
        &app,
        send_json(
            Method::PUT,
            "/api/offsets/USD-%3ECAD",
            json!({ "offset": "0.01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pair"], "USD->CAD");

    let (status, report) = call(&app, send_json(Method::POST, "/api/refresh", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["state"], "COMMITTED");
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 3);

    let (_, pairs) = call(&app, get("/api/pairs")).await;
    let rate_of = |id: &str| {
        pairs
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == id)
            .map(|p| p["middle_rate"].clone())
            .unwrap()
    };
    assert_eq!(decimal(&rate_of("USD->EUR")), dec!(0.92));
    assert_eq!(decimal(&rate_of("USD->CAD")), dec!(1.38));
    assert_eq!(rate_of("USD->XXX"), Value::Null);

    let (_, health) = call(&app, get("/health")).await;
    assert_eq!(health["last_run"], "COMMITTED");
}

#[tokio::test]
async fn test_negative_rate_lands_in_sync_log() {
    let app = create_test_app().await;
    add_pair(&app, "USD", "GBP").await;
    call(
        &app,
        send_json(
            Method::PUT,
            "/api/offsets/USD-%3EGBP",
            json!({ "offset": "-1" }),
        ),
    )
    .await;

    let (status, _) = call(&app, send_json(Method::POST, "/api/refresh", json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, log) = call(&app, get("/api/sync-log?limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    let entries = log.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["level"], "WARNING");
    let message = entries[0]["message"].as_str().unwrap();
    assert!(message.starts_with("Exchange rate for USD->GBP would be negative (-0.21"));
    assert!(message.ends_with(") and thus wasn't set"));
}

#[tokio::test]
async fn test_offset_configuration_lists_active_pairs() {
    let app = create_test_app().await;
    add_pair(&app, "USD", "EUR").await;
    call(
        &app,
        send_json(
            Method::POST,
            "/api/pairs",
            json!({ "source": "USD", "target": "INR", "is_active": false }),
        ),
    )
    .await;

    let (status, body) = call(&app, get("/api/offsets")).await;

    assert_eq!(status, StatusCode::OK);
    let settings = body.as_array().unwrap();
    assert_eq!(settings.len(), 1);
    assert_eq!(settings[0]["label"], "Offset USD->EUR");
    assert_eq!(decimal(&settings[0]["value"]), Decimal::ZERO);

    let (_, offset) = call(&app, get("/api/offsets/USD-%3EEUR")).await;
    assert_eq!(decimal(&offset["offset"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_invalid_pair_id_is_400() {
    let app = create_test_app().await;

    let (status, body) = call(&app, get("/api/offsets/USDEUR")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_app().await;

    let (status, body) = call(&app, get("/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/refresh"].is_object());
}
