//! Orchestration stages.

use std::fmt;

use serde::Serialize;

/// Position of the single orchestration run.
///
/// Stages advance strictly in declaration order up to [`Stage::Done`];
/// [`Stage::Aborted`] is terminal and reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    ConfigWritten,
    ArtifactsReady,
    FrontRunning,
    BackendRunning,
    DomainKnown,
    Published,
    Done,
    Aborted,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::ConfigWritten => "config_written",
            Stage::ArtifactsReady => "artifacts_ready",
            Stage::FrontRunning => "front_running",
            Stage::BackendRunning => "backend_running",
            Stage::DomainKnown => "domain_known",
            Stage::Published => "published",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Aborted)
    }

    /// Log message for a failure while trying to reach this stage.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Stage::Init => "Failed to prepare working directory",
            Stage::ConfigWritten => "Failed to write proxy configuration",
            Stage::ArtifactsReady => "Required executables are not available",
            Stage::FrontRunning => "Failed to start front process",
            Stage::BackendRunning => "Failed to start backend process",
            Stage::DomainKnown => "Failed to discover tunnel domain",
            Stage::Published => "Failed to publish subscription",
            Stage::Done | Stage::Aborted => "Orchestration already finished",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Stage::ArtifactsReady).unwrap(), "\"artifacts_ready\"");
        assert_eq!(Stage::DomainKnown.to_string(), "domain_known");
    }

    #[test]
    fn test_terminal_stages() {
        assert!(Stage::Done.is_terminal());
        assert!(Stage::Aborted.is_terminal());
        assert!(!Stage::Published.is_terminal());
    }
}
