//! Metrics collection and exposition.
//!
//! # Metrics
//! - `probe_requests_total` (counter): probes by mode, outcome
//! - `probe_duration_seconds` (histogram): probe latency by mode
//! - `probe_discovered_backends` (gauge): discovered ids by mode
//! - `animation_active_dots` (gauge): live markers by engine
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_probe(mode: &'static str, outcome: &'static str, latency: Duration) {
    counter!("probe_requests_total", "mode" => mode, "outcome" => outcome).increment(1);
    histogram!("probe_duration_seconds", "mode" => mode).record(latency.as_secs_f64());
}

pub fn record_discovered(mode: &'static str, count: usize) {
    gauge!("probe_discovered_backends", "mode" => mode).set(count as f64);
}

pub fn record_active_dots(engine: &'static str, count: usize) {
    gauge!("animation_active_dots", "engine" => engine).set(count as f64);
}
