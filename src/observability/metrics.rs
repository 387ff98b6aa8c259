//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define dispatch metrics (requests, latency, registry sizes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatches by method, outcome, status
//! - `router_dispatch_duration_seconds` (histogram): dispatch latency by outcome
//! - `router_routes_registered` (gauge): routes in the registry
//! - `router_filters_registered` (gauge): filters in the chain
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op, so tests need no setup
//! - Labels are low-cardinality: no paths, no request ids, and methods outside
//!   the standard set are reported as `OTHER`

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::dispatch::outcome::DispatchState;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished dispatch.
pub fn record_dispatch(method: &str, outcome: DispatchState, status: u16, elapsed: Duration) {
    metrics::counter!(
        "router_requests_total",
        "method" => method_label(method),
        "outcome" => outcome.as_str(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("router_dispatch_duration_seconds", "outcome" => outcome.as_str())
        .record(elapsed.as_secs_f64());
}

/// Standard method name for `method`, or `OTHER`.
pub fn method_label(method: &str) -> &'static str {
    const STANDARD: [&str; 9] = ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH", "TRACE", "CONNECT"];
    STANDARD
        .iter()
        .find(|m| m.eq_ignore_ascii_case(method))
        .copied()
        .unwrap_or("OTHER")
}

pub fn set_routes_registered(count: usize) {
    metrics::gauge!("router_routes_registered").set(count as f64);
}

pub fn set_filters_registered(count: usize) {
    metrics::gauge!("router_filters_registered").set(count as f64);
}
