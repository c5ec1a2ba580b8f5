//! Metrics recording and Prometheus exposition.
//!
//! All record functions are cheap no-ops until an exporter is installed,
//! so subsystems call them unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "sitekit_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("sitekit_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a request short-circuited by the abuse filter.
pub fn record_blocked(reason: &'static str) {
    counter!("sitekit_requests_blocked_total", "reason" => reason).increment(1);
}

/// Record the current number of open reload channels.
pub fn record_reload_clients(count: usize) {
    gauge!("sitekit_reload_clients").set(count as f64);
}

pub fn record_vendor_cache_hit() {
    counter!("sitekit_vendor_cache_hits_total").increment(1);
}

pub fn record_vendor_cache_miss() {
    counter!("sitekit_vendor_cache_misses_total").increment(1);
}

pub fn record_vendor_fetch_failure() {
    counter!("sitekit_vendor_fetch_failures_total").increment(1);
}

pub fn record_vendor_cache_size(size: usize) {
    gauge!("sitekit_vendor_cache_entries").set(size as f64);
}
