//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::credits::get_balance;
use crate::handlers::generate::{generate_from_pack, generate_image};
use crate::handlers::health::{health, ready};
use crate::handlers::images::list_images;
use crate::handlers::packs::list_packs;
use crate::handlers::training::{list_models, train_model};
use crate::handlers::webhooks::{image_webhook, training_webhook};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    // Authenticated user-facing routes, rate-limited per IP.
    let user_routes = Router::new()
        .route("/ai/training", post(train_model))
        .route("/ai/generate", post(generate_image))
        .route("/pack/generate", post(generate_from_pack))
        .route("/image/bulk", get(list_images))
        .route("/models", get(list_models))
        .route("/credits", get(get_balance))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    // Pack catalog is public reference data.
    let catalog_routes = Router::new().route("/pack/bulk", get(list_packs));

    // Provider callbacks authenticate by handle, not bearer token.
    let webhook_routes = Router::new()
        .route("/fal-ai/webhook/train", post(training_webhook))
        .route("/fal-ai/webhook/image", post(image_webhook));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(user_routes)
        .merge(catalog_routes)
        .merge(webhook_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
