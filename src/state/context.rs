use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::publish::SubscriptionArtifact;
use crate::state::stage::Stage;

/// Immutable view of the orchestration run at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub stage: Stage,
    pub domain: Option<Arc<str>>,
    pub subscription: Option<Arc<SubscriptionArtifact>>,
    /// Stage message of the failure that aborted the run.
    pub failure: Option<Arc<str>>,
}

impl Snapshot {
    fn initial() -> Self {
        Self {
            stage: Stage::Init,
            domain: None,
            subscription: None,
            failure: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            stage: self.stage,
            domain: self.domain.as_deref().map(str::to_string),
            subscription_ready: self.is_ready(),
            failure: self.failure.as_deref().map(str::to_string),
        }
    }
}

/// Serializable form of a [`Snapshot`] without the artifact payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub stage: Stage,
    pub domain: Option<String>,
    pub subscription_ready: bool,
    pub failure: Option<String>,
}

/// Shared orchestration state.
///
/// The orchestrator (and the components it delegates to) is the only
/// writer. Readers call [`RunContext::snapshot`] and never block; every
/// write swaps in a complete new [`Snapshot`].
#[derive(Debug)]
pub struct RunContext {
    inner: ArcSwap<Snapshot>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Snapshot::initial()),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.load_full()
    }

    pub fn stage(&self) -> Stage {
        self.inner.load().stage
    }

    /// Move to `stage`. Ignored once the run is terminal.
    pub fn advance(&self, stage: Stage) {
        self.update(|snapshot| {
            if !snapshot.stage.is_terminal() {
                snapshot.stage = stage;
            }
        });
    }

    pub fn publish_domain(&self, domain: &str) {
        let domain: Arc<str> = Arc::from(domain);
        self.update(|snapshot| snapshot.domain = Some(domain.clone()));
    }

    pub fn publish_subscription(&self, artifact: Arc<SubscriptionArtifact>) {
        self.update(|snapshot| snapshot.subscription = Some(artifact.clone()));
    }

    /// Mark the run aborted with `message`. Ignored once the run is terminal.
    pub fn abort(&self, message: &str) {
        let message: Arc<str> = Arc::from(message);
        self.update(|snapshot| {
            if !snapshot.stage.is_terminal() {
                snapshot.stage = Stage::Aborted;
                snapshot.failure = Some(message.clone());
            }
        });
    }

    fn update<F>(&self, apply: F)
    where
        F: Fn(&mut Snapshot),
    {
        self.inner.rcu(|current| {
            let mut next = Snapshot::clone(current);
            apply(&mut next);
            next
        });
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
