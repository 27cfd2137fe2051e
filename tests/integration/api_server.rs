//! Integration tests for the API Server
//!
//! Tests HTTP endpoints, health checks, metrics, and the movers routes.


use serde_json::Value;

use test_utils::TestApiServer;

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "swingscan-mover-engine");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    let _ = app.server.get("/api/movers/forex").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    for name in [
        "http_requests_total",
        "http_request_duration_seconds",
        "http_requests_in_flight",
        "movers_requests_total",
        "candle_cache_misses_total",
        "provider_fetch_duration_seconds",
    ] {
        assert!(body.contains(name), "Expected {} metric", name);
    }
}

#[tokio::test]
async fn metrics_middleware_counts_requests() {
    let app = TestApiServer::new().await;
    for _ in 0..3 {
        let _ = app.server.get("/health").await;
    }
    assert_eq!(app.metrics.http_requests_total.get(), 3);
    assert_eq!(app.metrics.http_requests_in_flight.get(), 0);
}

#[tokio::test]
async fn movers_endpoint_returns_ranked_movers() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .get("/api/movers/forex")
        .add_query_param("count", 3)
        .add_query_param("timeframe", "4h")
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["asset_type"], "Forex");
    assert_eq!(body["timeframe"], "4h");
    assert_eq!(body["count"], 3);

    let movers = body["movers"].as_array().unwrap();
    assert_eq!(movers.len(), 3);
    assert!(movers[0]["symbol"].is_string());
    assert!(movers[0]["movement"].is_string());
    assert!(movers[0].get("recommended_trade").is_none());
    assert_eq!(app.metrics.movers_requests_total.get(), 1);
}

#[tokio::test]
async fn movers_endpoint_defaults_unknown_timeframe_to_one_hour() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .get("/api/movers/crypto")
        .add_query_param("timeframe", "7w")
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["timeframe"], "1h");
    assert_eq!(body["movers"][0]["timeframe"], "1h");
}

#[tokio::test]
async fn invalid_asset_class_is_rejected() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/movers/stocks").await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("stocks"));
}

#[tokio::test]
async fn out_of_range_count_is_rejected() {
    let app = TestApiServer::new().await;
    for count in [0, 26] {
        let response = app
            .server
            .get("/api/movers/forex")
            .add_query_param("count", count)
            .await;
        assert_eq!(response.status_code(), 400);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("count"));
    }
}

#[tokio::test]
async fn ema_endpoint_annotates_movers() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .get("/api/movers/forex/ema")
        .add_query_param("count", 2)
        .add_query_param("short_term", "1h")
        .add_query_param("long_term", "4h")
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    for mover in body["movers"].as_array().unwrap() {
        assert!(mover["ema_values"]["10"].is_string());
        assert!(mover["ema_values"]["20"].is_string());
        assert!(mover["ema_values"]["50"].is_string());
        assert!(mover["ema_status"]["is_above_ema10"].is_boolean());
        assert!(mover.get("recommended_trade").is_none());
    }
}

#[tokio::test]
async fn recommendations_endpoint_attaches_trades() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .get("/api/movers/crypto/recommendations")
        .add_query_param("count", 3)
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let movers = body["movers"].as_array().unwrap();
    assert_eq!(movers.len(), 3);
    for mover in movers {
        let trade = &mover["recommended_trade"];
        assert!(trade["direction"] == "Buy" || trade["direction"] == "Sell");
        assert!(trade["entry_price"].is_string());
        assert!(trade["rationale"]
            .as_str()
            .unwrap()
            .starts_with(mover["symbol"].as_str().unwrap()));
    }
}
