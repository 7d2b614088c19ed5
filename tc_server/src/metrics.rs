//! Prometheus metrics for the calendar server.
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! [`init_metrics`] installs the exporter, so handlers record
//! unconditionally.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tc_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", 200);
//! metrics::login_attempts_total(true);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with a scrape listener on `addr`.
///
/// Metrics are served at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Increment the request counter by method and status.
pub fn http_requests_total(method: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment signups counter; `outcome` is `created` or `rejected`.
pub fn signups_total(outcome: &'static str) {
    metrics::counter!("signups_total", "outcome" => outcome).increment(1);
}

/// Increment the counter of requests turned away by the session gate.
pub fn auth_gate_rejections_total(reason: &'static str) {
    metrics::counter!("auth_gate_rejections_total", "reason" => reason).increment(1);
}

/// Add the number of sessions removed by a purge sweep.
pub fn sessions_purged(count: u64) {
    metrics::counter!("sessions_purged_total").increment(count);
}

// ============================================================================
// Event Metrics
// ============================================================================

/// Increment event operations counter.
pub fn events_total(op: &'static str, outcome: &'static str) {
    metrics::counter!("events_total",
        "op" => op,
        "outcome" => outcome
    )
    .increment(1);
}
