//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use super::service::MoverService;
use crate::error::EngineError;
use crate::metrics::Metrics;
use crate::models::indicators::Timeframe;
use crate::models::mover::{AssetType, MarketMover};

const DEFAULT_COUNT: usize = 10;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub service: Arc<MoverService>,
}

impl AppState {
    pub fn new(service: Arc<MoverService>, metrics: Arc<Metrics>) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            service,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Request validation failures rendered as `{"error": "..."}` with status 400.
#[derive(Debug)]
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "swingscan-mover-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Default, Deserialize)]
pub struct MoversQuery {
    count: Option<usize>,
    timeframe: Option<String>,
    short_term: Option<String>,
    long_term: Option<String>,
}

/// Parsed form of a movers request.
struct MoversRequest {
    asset_type: AssetType,
    count: usize,
    timeframe: Timeframe,
    short_term: Timeframe,
    long_term: Timeframe,
}

impl MoversRequest {
    fn parse(asset_class: &str, query: MoversQuery) -> Result<Self, EngineError> {
        let asset_type: AssetType = asset_class.parse()?;
        let lenient = |label: Option<String>, default: Timeframe| {
            label
                .map(|l| Timeframe::parse_lenient(&l))
                .unwrap_or(default)
        };
        Ok(Self {
            asset_type,
            count: query.count.unwrap_or(DEFAULT_COUNT),
            timeframe: lenient(query.timeframe, Timeframe::Hours1),
            short_term: lenient(query.short_term, Timeframe::Hours1),
            long_term: lenient(query.long_term, Timeframe::Hours4),
        })
    }
}

fn movers_body(request: &MoversRequest, movers: Vec<MarketMover>) -> Json<Value> {
    Json(json!({
        "asset_type": request.asset_type,
        "timeframe": request.timeframe,
        "count": movers.len(),
        "movers": movers,
    }))
}

/// Top movers for an asset class
async fn get_movers(
    State(state): State<AppState>,
    Path(asset_class): Path<String>,
    Query(query): Query<MoversQuery>,
) -> Result<Json<Value>, ApiError> {
    let request = MoversRequest::parse(&asset_class, query)?;
    let movers = state
        .service
        .get_top_movers(request.asset_type, request.count, request.timeframe)
        .await?;
    Ok(movers_body(&request, movers))
}

/// Top movers annotated with EMA state
async fn get_movers_with_ema(
    State(state): State<AppState>,
    Path(asset_class): Path<String>,
    Query(query): Query<MoversQuery>,
) -> Result<Json<Value>, ApiError> {
    let request = MoversRequest::parse(&asset_class, query)?;
    let movers = state
        .service
        .get_top_movers(request.asset_type, request.count, request.timeframe)
        .await?;
    let movers = state
        .service
        .apply_ema_filters(movers, request.short_term, request.long_term)
        .await;
    Ok(movers_body(&request, movers))
}

/// Top movers with EMA state and trade recommendations
async fn get_movers_with_recommendations(
    State(state): State<AppState>,
    Path(asset_class): Path<String>,
    Query(query): Query<MoversQuery>,
) -> Result<Json<Value>, ApiError> {
    let request = MoversRequest::parse(&asset_class, query)?;
    let movers = state
        .service
        .get_movers_with_recommendations(
            request.asset_type,
            request.count,
            request.timeframe,
            request.short_term,
            request.long_term,
        )
        .await?;
    Ok(movers_body(&request, movers))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/movers/{asset_class}", get(get_movers))
        .route("/api/movers/{asset_class}/ema", get(get_movers_with_ema))
        .route(
            "/api/movers/{asset_class}/recommendations",
            get(get_movers_with_recommendations),
        )
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    service: Arc<MoverService>,
    metrics: Arc<Metrics>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(service, metrics);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
