//! Startup orchestration.
//!
//! # Data Flow
//! ```text
//! Init            prepare_work_dir
//!   → ConfigWritten   ConfigGenerator::generate   (<work_dir>/config.json)
//!   → ArtifactsReady  ArtifactFetcher::ensure     (front, backend)
//!   → FrontRunning    ProcessSupervisor::launch_front
//!   → BackendRunning  ProcessSupervisor::launch_backend (token | quick tunnel)
//!   ·· startup grace (5s) ··
//!   → DomainKnown     DomainDiscoverer::discover   (≤ 15 × 2s)
//!   → Published       LinkPublisher::publish
//!   → Done
//!
//! any failure → Aborted (terminal, logged with a stage message)
//! ```
//!
//! # Design Decisions
//! - One run per process; a failed run is never retried automatically
//! - Stage progress is written to `RunContext`, the only state readers see
//! - Teardown is independent of the stage reached
//! - Front-only operation is not supported; a missing backend aborts the run
//! - An aborted run stops whatever it already started

mod error;

pub use error::{StageCause, StageError};

use std::sync::Arc;
use std::time::Duration;

use crate::artifacts::{ArchBucket, ArtifactFetcher, BACKEND_ARTIFACT, FRONT_ARTIFACT};
use crate::config::ServiceConfig;
use crate::discovery::DomainDiscoverer;
use crate::lifecycle::prepare_work_dir;
use crate::observability::metrics;
use crate::process::{BackendMode, ProcessSupervisor};
use crate::proxy_config::ConfigGenerator;
use crate::publish::{IspLookup, LinkPublisher};
use crate::resilience::{PollPolicy, Sleeper};
use crate::state::{RunContext, Stage};

use error::StageResultExt;

/// Delay between starting the backend and reading its log.
pub const STARTUP_GRACE: Duration = Duration::from_secs(5);

/// Sequences provisioning, launch, discovery and publication once.
pub struct Orchestrator {
    config: Arc<ServiceConfig>,
    context: Arc<RunContext>,
    supervisor: Arc<ProcessSupervisor>,
    generator: ConfigGenerator,
    fetcher: ArtifactFetcher,
    discoverer: DomainDiscoverer,
    publisher: LinkPublisher,
    sleeper: Arc<dyn Sleeper>,
    startup_grace: Duration,
    arch: ArchBucket,
}

impl Orchestrator {
    pub fn new(
        config: Arc<ServiceConfig>,
        context: Arc<RunContext>,
        supervisor: Arc<ProcessSupervisor>,
        fetcher: ArtifactFetcher,
        isp: Arc<dyn IspLookup>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            generator: ConfigGenerator::new(config.clone()),
            discoverer: DomainDiscoverer::new(config.clone(), sleeper.clone()),
            publisher: LinkPublisher::new(config.clone(), context.clone(), isp),
            config,
            context,
            supervisor,
            fetcher,
            sleeper,
            startup_grace: STARTUP_GRACE,
            arch: ArchBucket::detect(),
        }
    }

    pub fn with_discovery_policy(mut self, policy: PollPolicy) -> Self {
        self.discoverer = self.discoverer.with_policy(policy);
        self
    }

    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    /// Override the detected architecture bucket.
    pub fn with_arch(mut self, arch: ArchBucket) -> Self {
        self.arch = arch;
        self
    }

    pub fn context(&self) -> &Arc<RunContext> {
        &self.context
    }

    /// Run the whole sequence once.
    ///
    /// Failures are logged and recorded as [`Stage::Aborted`], and any
    /// process already started is stopped. The returned error is
    /// informational only.
    pub async fn run(&self) -> Result<(), StageError> {
        tracing::info!(work_dir = %self.config.work_dir().display(), "Orchestration starting");
        metrics::record_stage(Stage::Init);

        match self.run_stages().await {
            Ok(()) => {
                self.enter(Stage::Done);
                tracing::info!("Orchestration complete");
                Ok(())
            }
            Err(err) => {
                let message = err.stage.failure_message();
                tracing::error!(stage = %err.stage, error = %err.cause, "{message}");
                self.context.abort(message);
                metrics::record_stage(Stage::Aborted);
                self.supervisor.terminate_all().await;
                Err(err)
            }
        }
    }

    async fn run_stages(&self) -> Result<(), StageError> {
        prepare_work_dir(&self.config).await.at_stage(Stage::Init)?;

        self.generator.generate().await.at_stage(Stage::ConfigWritten)?;
        self.enter(Stage::ConfigWritten);

        self.fetcher.ensure(self.arch).await.at_stage(Stage::ArtifactsReady)?;
        self.enter(Stage::ArtifactsReady);

        self.supervisor
            .launch_front(&self.config.artifact_path(FRONT_ARTIFACT), &self.config.config_path())
            .at_stage(Stage::FrontRunning)?;
        self.enter(Stage::FrontRunning);

        let mode = BackendMode::select(&self.config);
        self.supervisor
            .launch_backend(&self.config.artifact_path(BACKEND_ARTIFACT), &mode)
            .at_stage(Stage::BackendRunning)?;
        self.enter(Stage::BackendRunning);

        tracing::debug!(grace = ?self.startup_grace, "Waiting for backend to initialize");
        self.sleeper.sleep(self.startup_grace).await;

        let domain = self.discoverer.discover().await.ok_or_else(|| {
            StageError::new(
                Stage::DomainKnown,
                StageCause::DiscoveryExhausted {
                    attempts: self.discoverer.policy().attempts(),
                },
            )
        })?;
        self.context.publish_domain(&domain);
        self.enter(Stage::DomainKnown);

        self.publisher.publish(&domain).await.at_stage(Stage::Published)?;
        self.enter(Stage::Published);

        Ok(())
    }

    fn enter(&self, stage: Stage) {
        self.context.advance(stage);
        metrics::record_stage(stage);
        tracing::info!(stage = %stage, "Stage reached");
    }

    /// Stop every child process. Reachable from any stage.
    pub async fn teardown(&self) {
        tracing::info!(stage = %self.context.stage(), "Tearing down managed processes");
        self.supervisor.terminate_all().await;
    }
}
