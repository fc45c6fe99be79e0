//! Token-bucket rate limiting, keyed by client address and matched route.
//!
//! Buckets are keyed on the route pattern rather than the request path, so
//! `/user/1` and `/user/2` share one bucket per client. Buckets that have
//! refilled to capacity carry no state and are pruned periodically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::Response;
use dashmap::DashMap;
use futures_util::future::BoxFuture;

use crate::config::schema::RateLimitConfig;
use crate::http::request::Request;
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{Middleware, Next};

/// Checks between prune passes.
const PRUNE_INTERVAL: u64 = 1024;

/// A simple token bucket.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Whether the bucket would be back at capacity by `now`.
    fn is_full(&self, now: Instant, capacity: f64, refill_rate: f64) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.tokens + elapsed * refill_rate >= capacity
    }
}

/// The `rate_limit` middleware.
///
/// Each (client ip, route) pair gets its own bucket holding `burst_size`
/// tokens, refilled at `requests_per_second`.
#[derive(Debug)]
pub struct RateLimit {
    buckets: DashMap<String, TokenBucket>,
    checks: AtomicU64,
    rps: f64,
    burst: f64,
}

impl RateLimit {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            checks: AtomicU64::new(0),
            rps: f64::from(config.requests_per_second),
            burst: f64::from(config.burst_size),
        }
    }

    fn key(request: &Request, route: &str) -> String {
        let client = request
            .remote_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!("{} {}", client, route)
    }

    /// Take a token for `key`, returning false when the bucket is empty.
    pub fn check(&self, key: &str) -> bool {
        let allowed = match self.buckets.get_mut(key) {
            Some(mut bucket) => bucket.try_acquire(self.burst, self.rps),
            None => self
                .buckets
                .entry(key.to_string())
                .or_insert_with(|| TokenBucket::new(self.burst))
                .try_acquire(self.burst, self.rps),
        };

        // No shard guard is held past this point.
        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_INTERVAL == 0 {
            self.prune();
        }
        allowed
    }

    /// Drop buckets that have refilled to capacity.
    pub fn prune(&self) {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| !bucket.is_full(now, self.burst, self.rps));
        let pruned = before.saturating_sub(self.buckets.len());
        if pruned > 0 {
            tracing::debug!(pruned, remaining = self.buckets.len(), "Pruned idle rate limit buckets");
        }
    }

    /// Number of tracked buckets.
    pub fn tracked(&self) -> usize {
        self.buckets.len()
    }
}

impl Middleware for RateLimit {
    fn handle<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        let key = Self::key(&request, next.route());
        if self.check(&key) {
            return next.run(request);
        }

        tracing::warn!(
            request_id = request.request_id().unwrap_or("-"),
            client = %key,
            "Rate limit exceeded"
        );
        metrics::record_rate_limited("rps_limit");
        Box::pin(async { response::text(StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded") })
    }
}
