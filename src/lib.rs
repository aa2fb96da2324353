//! Marketplace API Library
//!
//! Backend of a B2B marketplace: customer authentication, catalog browsing,
//! favorites, reservations, purchase orders and partner management.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod migrator;
pub mod rate_limiter;
pub mod services;
pub mod tracing;

use axum::{http::HeaderValue, routing::get, Extension, Router};
use rate_limiter::{RateLimitConfig, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub auth: Arc<auth::AuthService>,
    pub services: services::AppServices,
    /// Per-IP limiter in front of every `/api` route
    pub api_limiter: RateLimiter,
    /// Per-phone limiter for login attempts
    pub login_limiter: RateLimiter,
}

impl AppState {
    /// Wires auth, services and both rate limiters from configuration.
    pub fn new(db: Arc<db::DbPool>, config: config::AppConfig) -> Self {
        let auth = Arc::new(auth::AuthService::new(auth::AuthConfig::from(&config)));
        let services =
            services::AppServices::new(db.clone(), auth.clone(), config.default_currency.clone());

        let api_limiter = RateLimiter::in_memory(RateLimitConfig::new(
            config.rate_limit_requests_per_window,
            Duration::from_secs(config.rate_limit_window_seconds),
        ));
        let login_limiter = RateLimiter::in_memory(RateLimitConfig::new(
            config.login_rate_limit_attempts,
            Duration::from_secs(config.login_rate_limit_window_seconds),
        ));

        Self {
            db,
            config,
            auth,
            services,
            api_limiter,
            login_limiter,
        }
    }
}

/// One CORS header set shared by every route. Without configured origins any
/// origin is allowed.
pub fn build_cors_layer(config: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Builds the full application router.
///
/// - `/api/...` carries the domain routes behind the per-IP rate limiter
/// - the metrics path (`PROMETHEUS_ENDPOINT`) and `/health` sit outside it
pub fn build_router(state: AppState) -> Router {
    let api = handlers::api_routes()
        .layer(axum::middleware::from_fn_with_state(
            state.api_limiter.clone(),
            rate_limiter::rate_limit_middleware,
        ))
        .with_state(Arc::new(state.clone()));

    Router::new()
        .nest("/api", api)
        .route(
            state.config.prometheus_endpoint.as_str(),
            get(metrics::metrics_handler),
        )
        .merge(health::health_routes(state.db.clone()))
        .layer(axum::middleware::from_fn(metrics::track_http_metrics))
        .layer(crate::tracing::configure_http_tracing())
        .layer(build_cors_layer(&state.config))
        // Inject AuthService into request extensions for auth middleware
        .layer(Extension(state.auth.clone()))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(crate::tracing::request_id_middleware))
}
