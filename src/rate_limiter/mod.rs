/*!
 * # Rate Limiting Module
 *
 * Fixed-window request counting keyed by an arbitrary string (client IP for the
 * API as a whole, `login:<phone>` for login attempts).
 *
 * - The first hit on a key, or the first hit after its window expired, opens a
 *   new window with `count = 1`.
 * - Every further hit increments `count`; the hit is rejected once `count > limit`.
 * - Standard rate limit headers (X-RateLimit-*) and `Retry-After` on rejection.
 *
 * State is process local and is not persisted across restarts.
 */

use crate::errors::ServiceError;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Converts a number to an HTTP header value; digits are always valid header bytes.
fn num_to_header_value<T: ToString>(n: T) -> HeaderValue {
    HeaderValue::from_str(&n.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub window_duration: Duration,
    pub enable_headers: bool,
}

impl RateLimitConfig {
    pub fn new(requests_per_window: u32, window_duration: Duration) -> Self {
        Self {
            requests_per_window,
            window_duration,
            enable_headers: true,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}

/// Outcome of a single hit against the limiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: Duration,
}

impl RateLimitResult {
    /// Seconds a rejected client should wait, never less than one.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_time.as_secs();
        if self.reset_time.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs.max(1)
        }
    }

    /// Writes the X-RateLimit-* headers onto a response.
    pub fn apply_headers(&self, response: &mut Response) {
        let headers = response.headers_mut();
        headers.insert("X-RateLimit-Limit", num_to_header_value(self.limit));
        headers.insert("X-RateLimit-Remaining", num_to_header_value(self.remaining));
        headers.insert(
            "X-RateLimit-Reset",
            num_to_header_value(self.reset_time.as_secs()),
        );
    }

    /// The 429 response for a rejected hit.
    pub fn rejection(&self) -> Response {
        let mut response = ServiceError::RateLimitExceeded {
            retry_after_secs: self.retry_after_secs(),
        }
        .into_response();
        self.apply_headers(&mut response);
        response
    }
}

/// In-memory fixed-window rate limiter. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct RateLimiter {
    entries: Arc<DashMap<String, RateLimitEntry>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn in_memory(config: RateLimitConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Records a hit for `key` and reports whether it is within the limit.
    pub fn check_rate_limit(&self, key: &str) -> RateLimitResult {
        self.check_at(key, Instant::now())
    }

    pub(crate) fn check_at(&self, key: &str, now: Instant) -> RateLimitResult {
        let limit = self.config.requests_per_window;
        let window = self.config.window_duration;

        // The entry guard holds the shard lock, so concurrent hits on one key serialize here.
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry {
                count: 0,
                expires_at: now + window,
            });

        if now >= entry.expires_at {
            entry.count = 0;
            entry.expires_at = now + window;
        }
        entry.count = entry.count.saturating_add(1);

        RateLimitResult {
            allowed: entry.count <= limit,
            limit,
            remaining: limit - entry.count.min(limit),
            reset_time: entry.expires_at.saturating_duration_since(now),
        }
    }

    /// Remaining hits for `key` without recording one.
    pub fn get_remaining_quota(&self, key: &str) -> u32 {
        let limit = self.config.requests_per_window;
        match self.entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => limit - entry.count.min(limit),
            _ => limit,
        }
    }

    /// Forgets all hits recorded for `key`.
    pub fn reset(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drops entries whose window has passed. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    pub(crate) fn cleanup_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before - self.entries.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}

/// Client IP key: `x-forwarded-for` (first hop), then `x-real-ip`, then `unknown`.
pub fn extract_ip_key(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return format!("ip:{}", ip);
                }
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return format!("ip:{}", ip_str.trim());
        }
    }

    "ip:unknown".to_string()
}

pub fn login_key(normalized_phone: &str) -> String {
    format!("login:{}", normalized_phone)
}

/// Per-IP limiter for the API router.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let key = extract_ip_key(&request);
    let result = limiter.check_rate_limit(&key);

    if !result.allowed {
        warn!(key = %key, limit = result.limit, "Rate limit exceeded");
        crate::metrics::record_rate_limited("api");
        return result.rejection();
    }

    let mut response = next.run(request).await;
    if limiter.config().enable_headers {
        result.apply_headers(&mut response);
    }
    response
}

/// Background cleanup loop for a limiter
pub async fn start_cleanup_task(rate_limiter: RateLimiter, interval: Duration) {
    let mut interval_timer = tokio::time::interval(interval);

    loop {
        interval_timer.tick().await;
        let removed = rate_limiter.cleanup_expired();
        debug!(removed, "Rate limiter cleanup completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn limiter(limit: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::in_memory(RateLimitConfig::new(limit, Duration::from_secs(window_secs)))
    }

    #[test]
    fn allows_up_to_limit_then_rejects() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let result = limiter.check_at("k", now);
            assert!(result.allowed);
            assert_eq!(result.remaining, expected_remaining);
        }

        let rejected = limiter.check_at("k", now);
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
        assert_eq!(rejected.reset_time, Duration::from_secs(60));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = limiter(1, 10);
        let start = Instant::now();

        assert!(limiter.check_at("k", start).allowed);
        assert!(!limiter.check_at("k", start + Duration::from_secs(9)).allowed);

        let fresh = limiter.check_at("k", start + Duration::from_secs(10));
        assert!(fresh.allowed);
        assert_eq!(fresh.reset_time, Duration::from_secs(10));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.check_at("a", now).allowed);
        assert!(limiter.check_at("b", now).allowed);
        assert!(!limiter.check_at("a", now).allowed);
    }

    #[test]
    fn reset_forgets_key() {
        let limiter = limiter(1, 60);
        assert!(limiter.check_rate_limit("login:+79123456789").allowed);
        assert!(!limiter.check_rate_limit("login:+79123456789").allowed);
        limiter.reset("login:+79123456789");
        assert!(limiter.check_rate_limit("login:+79123456789").allowed);
    }

    #[test]
    fn cleanup_drops_only_expired_entries() {
        let limiter = limiter(5, 10);
        let start = Instant::now();
        limiter.check_at("old", start);
        limiter.check_at("new", start + Duration::from_secs(8));

        assert_eq!(limiter.cleanup_expired_at(start + Duration::from_secs(11)), 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn concurrent_hits_are_all_counted() {
        let limiter = limiter(1_000, 60);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        limiter.check_rate_limit("shared");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(limiter.get_remaining_quota("shared"), 200);
    }

    #[test]
    fn retry_after_rounds_up() {
        let result = RateLimitResult {
            allowed: false,
            limit: 1,
            remaining: 0,
            reset_time: Duration::from_millis(1_500),
        };
        assert_eq!(result.retry_after_secs(), 2);
    }

    #[test]
    fn ip_key_prefers_forwarded_for() {
        let request = HttpRequest::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_ip_key(&request), "ip:203.0.113.7");

        let request = HttpRequest::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_ip_key(&request), "ip:unknown");
    }

    #[tokio::test]
    async fn middleware_rejects_with_headers() {
        let limiter = limiter(1, 60);
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ));

        let first = app
            .clone()
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers().get("X-RateLimit-Remaining").unwrap(), "0");

        let second = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers().get("X-RateLimit-Limit").unwrap(), "1");
        assert_eq!(second.headers().get("Retry-After").unwrap(), "60");
    }
}
