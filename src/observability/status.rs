//! Periodic status reporting.
//!
//! # Responsibilities
//! - Collect a point-in-time [`ServiceStatus`] from shared state
//! - Log it every `status_interval_secs` until shutdown
//!
//! # Design Decisions
//! - Reads only; never waits on orchestration progress

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::ServiceConfig;
use crate::lifecycle::ShutdownSignal;
use crate::process::{ProcessSupervisor, ProcessTag};
use crate::state::{RunContext, Stage};

/// Operational view served on `/status` and logged by [`StatusReporter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub version: &'static str,
    pub stage: Stage,
    pub domain: Option<String>,
    pub subscription_ready: bool,
    pub subscription_path: String,
    pub front_running: bool,
    pub backend_running: bool,
    pub failure: Option<String>,
}

impl ServiceStatus {
    pub fn collect(config: &ServiceConfig, context: &RunContext, supervisor: &ProcessSupervisor) -> Self {
        let summary = context.snapshot().summary();
        Self {
            version: env!("CARGO_PKG_VERSION"),
            stage: summary.stage,
            domain: summary.domain,
            subscription_ready: summary.subscription_ready,
            subscription_path: format!("/{}", config.sub_path()),
            front_running: supervisor.is_running(ProcessTag::Front),
            backend_running: supervisor.is_running(ProcessTag::Backend),
            failure: summary.failure,
        }
    }
}

/// Logs a [`ServiceStatus`] at a fixed interval.
pub struct StatusReporter {
    config: Arc<ServiceConfig>,
    context: Arc<RunContext>,
    supervisor: Arc<ProcessSupervisor>,
    interval: Duration,
}

impl StatusReporter {
    pub fn new(config: Arc<ServiceConfig>, context: Arc<RunContext>, supervisor: Arc<ProcessSupervisor>) -> Self {
        let interval = Duration::from_secs(config.status_interval_secs.max(1));
        Self {
            config,
            context,
            supervisor,
            interval,
        }
    }

    pub fn report(&self) -> ServiceStatus {
        let status = ServiceStatus::collect(&self.config, &self.context, &self.supervisor);
        tracing::info!(
            stage = %status.stage,
            domain = status.domain.as_deref().unwrap_or("-"),
            subscription_ready = status.subscription_ready,
            front_running = status.front_running,
            backend_running = status.backend_running,
            "Service status"
        );
        status
    }

    pub async fn run(self, mut shutdown: ShutdownSignal) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.report();
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Status reporter stopped");
                    return;
                }
            }
        }
    }
}
