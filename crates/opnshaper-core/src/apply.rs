// ── Stage + commit ──
//
// A mutation is first staged (add/set/del), then made live by the
// service-wide reconfigure. A staging failure is fatal and nothing is
// committed. A commit failure after a successful stage is only a warning:
// the change is saved on the firewall and the next reconfigure applies it.

use std::future::Future;

use opnshaper_api::ApiClient;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{CoreError, OpContext};

/// Where a mutation ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ApplyState {
    /// Staged; no commit was attempted.
    Staged,
    /// Staged and live.
    Committed,
    /// Staged, but the reconfigure did not succeed.
    StagedCommitFailed { warning: String },
}

impl ApplyState {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::StagedCommitFailed { warning } => Some(warning),
            Self::Staged | Self::Committed => None,
        }
    }
}

/// Result of a successful stage, with the commit outcome alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<T> {
    pub output: T,
    pub state: ApplyState,
}

impl<T> Applied<T> {
    pub fn warning(&self) -> Option<&str> {
        self.state.warning()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
        Applied {
            output: f(self.output),
            state: self.state,
        }
    }
}

/// Runs a stage step and, if it succeeds, exactly one reconfigure.
pub struct ApplyCoordinator<'a> {
    client: &'a ApiClient,
    commit: bool,
}

impl<'a> ApplyCoordinator<'a> {
    /// `commit = false` stages only and reports [`ApplyState::Staged`].
    pub fn new(client: &'a ApiClient, commit: bool) -> Self {
        Self { client, commit }
    }

    pub async fn apply<T, F>(&self, ctx: &OpContext, stage: F) -> Result<Applied<T>, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        let output = stage.await?;
        info!(%ctx, "staged");

        let state = if self.commit {
            self.commit_staged(ctx).await
        } else {
            ApplyState::Staged
        };
        Ok(Applied { output, state })
    }

    /// Issue one reconfigure and classify the answer. Never fails: a bad
    /// answer becomes [`ApplyState::StagedCommitFailed`].
    pub async fn commit_staged(&self, ctx: &OpContext) -> ApplyState {
        let warning = match self.client.reconfigure_shaper().await {
            Ok(status) if status.is_ok() => {
                info!(%ctx, "committed");
                return ApplyState::Committed;
            }
            Ok(status) => format!(
                "{ctx}: change staged but reconfigure returned status '{}'; \
                 run reconfigure to apply it",
                status.status
            ),
            Err(e) => format!(
                "{ctx}: change staged but reconfigure failed ({e}); run reconfigure to apply it"
            ),
        };
        warn!("{warning}");
        ApplyState::StagedCommitFailed { warning }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_failed_commit_carries_a_warning() {
        assert_eq!(ApplyState::Committed.warning(), None);
        assert_eq!(ApplyState::Staged.warning(), None);
        let failed = ApplyState::StagedCommitFailed {
            warning: "later".into(),
        };
        assert_eq!(failed.warning(), Some("later"));
        assert!(!failed.is_committed());
    }

    #[test]
    fn map_keeps_state() {
        let applied = Applied {
            output: 2,
            state: ApplyState::Committed,
        }
        .map(|n| n * 2);
        assert_eq!(applied.output, 4);
        assert!(applied.state.is_committed());
    }
}
