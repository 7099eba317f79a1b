//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Record per-request counters and latency histograms
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `fsrouter_requests_total` (counter): requests by method, status, route
//! - `fsrouter_request_duration_seconds` (histogram): latency by route
//!
//! # Design Decisions
//! - Low-overhead updates; recording is safe before the exporter exists
//! - The route label is the matched source file, or "none" for 404s and
//!   middleware failures

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(error) => tracing::error!(error = %error, "failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    metrics::counter!(
        "fsrouter_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "fsrouter_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(elapsed);
}
