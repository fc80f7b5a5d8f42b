//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bitsim_rpc_calls_total` (counter): RPC calls by method and outcome
//! - `bitsim_rpc_duration_seconds` (histogram): RPC round-trip latency by method
//! - `bitsim_blocks_mined_total` (counter): blocks produced via `generatetoaddress`
//! - `bitsim_graph_entries_pushed_total` (counter): transaction-graph entries flushed
//! - `bitsim_sim_steps_total` (counter): orchestrator steps by step name

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rpc_call(method: &str, outcome: &'static str, started: Instant) {
    metrics::counter!(
        "bitsim_rpc_calls_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("bitsim_rpc_duration_seconds", "method" => method.to_string())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_blocks_mined(count: usize) {
    metrics::counter!("bitsim_blocks_mined_total").increment(count as u64);
}

pub fn record_entries_pushed(count: usize) {
    metrics::counter!("bitsim_graph_entries_pushed_total").increment(count as u64);
}

pub fn record_step(step: &'static str) {
    metrics::counter!("bitsim_sim_steps_total", "step" => step).increment(1);
}
