//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{analyze_frame, analyze_landmarks, analyze_video, health, status};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let rate_limiter = Arc::new(
        RateLimiterCache::new(state.config.rate_limit_rps)
            .trust_forwarded_headers(state.config.trust_forwarded_for),
    );

    let analysis_routes = Router::new()
        .route("/analyze-frame", post(analyze_frame))
        .route("/analyze-landmarks", post(analyze_landmarks))
        .route("/analyze-video", post(analyze_video))
        .route("/status", get(status))
        .layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware));

    let api_routes = Router::new()
        .merge(analysis_routes)
        .route("/health", get(health));

    let root_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/status", get(status));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(root_routes)
        .merge(metrics_routes)
        // Frames are large; the configured limit replaces axum's 2MB default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
