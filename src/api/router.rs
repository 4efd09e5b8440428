use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::handlers;

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Gateway service: cached DeFi data for the dashboard.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Protocols and chains
        .route("/api/protocols", get(handlers::protocols::list))
        .route("/api/chains", get(handlers::chains::list))
        .route("/api/chains/:name", get(handlers::chains::detail))
        // Chain overview
        .route("/api/aggregated/:chain", get(handlers::aggregated::summary))
        .route("/api/historical/:chain", get(handlers::aggregated::historical))
        // Fees
        .route("/api/fees", get(handlers::fees::list))
        .route("/api/fees/history", get(handlers::fees::history))
        // Liquid staking
        .route("/api/liquid-staking", get(handlers::staking::list))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Document passthrough service.
pub fn create_data_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/data", get(handlers::data::list))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Event ingestion service. The only one exposing Prometheus metrics.
pub fn create_analytics_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .route("/api/analytics", post(handlers::analytics::ingest))
        .route("/api/analytics/events", get(handlers::analytics::recent))
        .route_layer(middleware::from_fn(crate::metrics::track_http))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
