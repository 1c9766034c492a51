use std::io;

use thiserror::Error;

use crate::artifacts::FetchError;
use crate::process::LaunchError;
use crate::proxy_config::WriteConfigError;
use crate::publish::PublishError;
use crate::state::Stage;

/// What went wrong while trying to reach a stage.
#[derive(Debug, Error)]
pub enum StageCause {
    #[error(transparent)]
    Prepare(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] WriteConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("no domain after {attempts} attempts")]
    DiscoveryExhausted { attempts: u32 },

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// A failed orchestration run: the stage that could not be reached and why.
#[derive(Debug, Error)]
#[error("{}: {}", .stage.failure_message(), .cause)]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub cause: StageCause,
}

impl StageError {
    pub fn new(stage: Stage, cause: impl Into<StageCause>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }
}

/// Attach the target stage to a component error.
pub(crate) trait StageResultExt<T> {
    fn at_stage(self, stage: Stage) -> Result<T, StageError>;
}

impl<T, E> StageResultExt<T> for Result<T, E>
where
    E: Into<StageCause>,
{
    fn at_stage(self, stage: Stage) -> Result<T, StageError> {
        self.map_err(|e| StageError::new(stage, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_leads_with_stage_message() {
        let err = StageError::new(Stage::DomainKnown, StageCause::DiscoveryExhausted { attempts: 15 });
        assert_eq!(
            err.to_string(),
            "Failed to discover tunnel domain: no domain after 15 attempts"
        );
    }
}
