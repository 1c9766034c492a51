//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edgelink_stage_transitions_total` (counter): stages reached, by `stage`
//! - `edgelink_artifact_downloads_total` (counter): by `artifact`, `outcome`
//! - `edgelink_discovery_attempts_total` (counter): boot log scans
//! - `edgelink_subscription_requests_total` (counter): by `ready`
//! - `edgelink_managed_processes` (gauge): tracked child processes
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::state::Stage;

/// Start the Prometheus scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_stage(stage: Stage) {
    metrics::counter!("edgelink_stage_transitions_total", "stage" => stage.as_str()).increment(1);
}

pub fn record_download(artifact: &str, outcome: &'static str) {
    metrics::counter!(
        "edgelink_artifact_downloads_total",
        "artifact" => artifact.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_discovery_attempt() {
    metrics::counter!("edgelink_discovery_attempts_total").increment(1);
}

pub fn record_subscription_request(ready: bool) {
    let ready = if ready { "true" } else { "false" };
    metrics::counter!("edgelink_subscription_requests_total", "ready" => ready).increment(1);
}

pub fn set_managed_processes(count: usize) {
    metrics::gauge!("edgelink_managed_processes").set(count as f64);
}
