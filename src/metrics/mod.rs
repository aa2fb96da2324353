//! Prometheus metrics for the marketplace API.
//!
//! All collectors live in one dedicated [`Registry`] so the scrape output only
//! carries what this service defines.

use axum::{
    extract::{MatchedPath, Request},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::time::Instant;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
    #[error("Metrics output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn register<C>(collector: C) -> C
where
    C: prometheus::core::Collector + Clone + 'static,
{
    REGISTRY
        .register(Box::new(collector.clone()))
        .expect("metric can be registered");
    collector
}

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register(
        IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"]
        )
        .expect("metric can be created")
    );
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register(
        HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds"
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["method", "path"]
        )
        .expect("metric can be created")
    );
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGauge = register(
        IntGauge::new("http_requests_in_flight", "HTTP requests currently being served")
            .expect("metric can be created")
    );
    pub static ref LOGIN_ATTEMPTS_TOTAL: IntCounterVec = register(
        IntCounterVec::new(
            Opts::new("login_attempts_total", "Login attempts by outcome"),
            &["outcome"]
        )
        .expect("metric can be created")
    );
    pub static ref RATE_LIMITED_TOTAL: IntCounterVec = register(
        IntCounterVec::new(
            Opts::new("rate_limited_requests_total", "Requests rejected by a rate limiter"),
            &["limiter"]
        )
        .expect("metric can be created")
    );
    pub static ref RESERVATIONS_CREATED_TOTAL: IntCounter = register(
        IntCounter::new("reservations_created_total", "Reservations created")
            .expect("metric can be created")
    );
    pub static ref PURCHASE_ORDERS_CREATED_TOTAL: IntCounter = register(
        IntCounter::new("purchase_orders_created_total", "Purchase orders created")
            .expect("metric can be created")
    );
    pub static ref PURCHASE_ORDER_STATUS_CHANGES_TOTAL: IntCounterVec = register(
        IntCounterVec::new(
            Opts::new(
                "purchase_order_status_changes_total",
                "Purchase order status transitions by target status"
            ),
            &["status"]
        )
        .expect("metric can be created")
    );
}

pub fn record_login(outcome: &str) {
    LOGIN_ATTEMPTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_rate_limited(limiter: &str) {
    RATE_LIMITED_TOTAL.with_label_values(&[limiter]).inc();
}

pub fn record_reservation_created() {
    RESERVATIONS_CREATED_TOTAL.inc();
}

pub fn record_purchase_order_created() {
    PURCHASE_ORDERS_CREATED_TOTAL.inc();
}

pub fn record_purchase_order_status(status: &str) {
    PURCHASE_ORDER_STATUS_CHANGES_TOTAL
        .with_label_values(&[status])
        .inc();
}

/// Renders every registered collector in the Prometheus text format.
pub fn render() -> Result<String, MetricsError> {
    // Touch the lazies so their series appear before the first observation.
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_REQUEST_DURATION_SECONDS);
    lazy_static::initialize(&HTTP_REQUESTS_IN_FLIGHT);
    lazy_static::initialize(&LOGIN_ATTEMPTS_TOTAL);
    lazy_static::initialize(&RATE_LIMITED_TOTAL);
    lazy_static::initialize(&RESERVATIONS_CREATED_TOTAL);
    lazy_static::initialize(&PURCHASE_ORDERS_CREATED_TOTAL);
    lazy_static::initialize(&PURCHASE_ORDER_STATUS_CHANGES_TOTAL);

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Scrape endpoint handler
pub async fn metrics_handler() -> Response {
    match render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics").into_response()
        }
    }
}

/// Records count, latency and in-flight requests for every routed request.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    HTTP_REQUESTS_IN_FLIGHT.inc();
    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();
    HTTP_REQUESTS_IN_FLIGHT.dec();

    let status = response.status().as_u16().to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(elapsed);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn render_includes_registered_families() {
        record_login("success");
        let output = render().unwrap();
        assert!(output.contains("login_attempts_total{outcome=\"success\"}"));
        assert!(output.contains("# TYPE http_requests_in_flight gauge"));
    }

    #[tokio::test]
    async fn middleware_counts_by_matched_path() {
        let app = Router::new()
            .route("/items/:id", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(track_http_metrics));

        let before = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/items/:id", "200"])
            .get();

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/items/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let after = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/items/:id", "200"])
            .get();
        assert_eq!(after, before + 1);
    }
}
