//! Metrics collection and exposition.
//!
//! # Metrics
//! - `payment_simulator_requests_total` (counter): responses by status
//! - `payment_simulator_request_duration_seconds` (histogram): frame latency
//! - `payment_simulator_active_connections` (gauge): live connection handlers
//! - `payment_simulator_connections_closed_total` (counter): closed connections by reason
//! - `payment_simulator_accept_errors_total` (counter): transient accept failures

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(status: &'static str, started: Instant) {
    counter!("payment_simulator_requests_total", "status" => status).increment(1);
    histogram!("payment_simulator_request_duration_seconds")
        .record(started.elapsed().as_secs_f64());
}

pub fn connection_opened() {
    gauge!("payment_simulator_active_connections").increment(1.0);
}

pub fn connection_closed(reason: &'static str) {
    gauge!("payment_simulator_active_connections").decrement(1.0);
    counter!("payment_simulator_connections_closed_total", "reason" => reason).increment(1);
}

pub fn record_accept_error() {
    counter!("payment_simulator_accept_errors_total").increment(1);
}
