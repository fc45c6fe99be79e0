//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (requests, latency, rate limiting, reloads)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by method, outcome
//! - `router_request_duration_seconds` (histogram): dispatch latency
//! - `router_rate_limited_total` (counter): rejections by reason
//! - `router_config_reloads_total` (counter): reloads by result
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels stay low-cardinality: no paths or hosts

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one dispatched request.
pub fn record_dispatch(method: &str, outcome: &'static str, start: Instant) {
    let method = method.to_string();
    metrics::counter!(
        "router_requests_total",
        "method" => method.clone(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "router_request_duration_seconds",
        "method" => method,
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(reason: &'static str) {
    metrics::counter!("router_rate_limited_total", "reason" => reason).increment(1);
}

pub fn record_reload(ok: bool) {
    let result = if ok { "success" } else { "failure" };
    metrics::counter!("router_config_reloads_total", "result" => result).increment(1);
}
