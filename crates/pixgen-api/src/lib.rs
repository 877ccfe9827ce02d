//! Axum HTTP API server.
//!
//! This crate provides:
//! - Credit-gated training and generation submission endpoints
//! - Provider completion webhooks
//! - Bearer token verification
//! - Rate limiting, security headers and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{CallbackOutcome, CompletionReconciler, GenerationOrchestrator};
pub use state::AppState;
