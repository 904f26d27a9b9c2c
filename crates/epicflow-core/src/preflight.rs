//! Repository preconditions for lifecycle transitions.
//!
//! [`BranchState`] is read fresh from git every time; [`PreflightChecker`]
//! turns it into pass or a single [`PreflightFailure`].

use crate::config::EpicflowConfig;
use crate::error::{EpicError, Result};
use crate::tools::git::{Divergence, GitAdapter};
use serde::Serialize;
use std::fmt;

/// Why a preflight check refused the transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightFailure {
    /// Untracked, modified or staged files are present.
    DirtyWorkingTree { changes: Vec<String> },

    /// The configured default branch is checked out.
    OnDefaultBranch { branch: String },

    /// The upstream has commits the local branch lacks.
    BranchBehindRemote { behind: u32 },
}

impl fmt::Display for PreflightFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreflightFailure::DirtyWorkingTree { changes } => {
                write!(f, "working tree has {} uncommitted change(s)", changes.len())?;
                for change in changes.iter().take(10) {
                    write!(f, "\n  {}", change)?;
                }
                if changes.len() > 10 {
                    write!(f, "\n  ...")?;
                }
                Ok(())
            }
            PreflightFailure::OnDefaultBranch { branch } => write!(
                f,
                "on default branch `{}`; switch to the epic branch first",
                branch
            ),
            PreflightFailure::BranchBehindRemote { behind } => write!(
                f,
                "branch is {} commit(s) behind its upstream; pull first",
                behind
            ),
        }
    }
}

/// Snapshot of the repository's branch state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchState {
    /// Checked-out branch.
    pub branch: String,

    /// Porcelain status entries; empty when clean.
    pub changes: Vec<String>,

    /// Divergence from the upstream, `None` without one.
    pub upstream: Option<Divergence>,
}

impl BranchState {
    /// Reads the current state, fetching the remote first when configured.
    /// A failed fetch only logs a warning.
    pub fn read(config: &EpicflowConfig, git: &dyn GitAdapter) -> Result<Self> {
        let root = &config.repo_root;

        if config.git.fetch_before_preflight
            && let Err(e) = git.fetch(root, &config.git.remote)
        {
            tracing::warn!(remote = %config.git.remote, error = %e, "fetch failed, comparing against local refs");
        }

        let state = Self {
            branch: git.current_branch(root)?,
            changes: git.status(root)?,
            upstream: git.upstream_divergence(root)?,
        };
        tracing::debug!(branch = %state.branch, clean = state.is_clean(), upstream = ?state.upstream, "branch state");
        Ok(state)
    }

    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Validates branch state before a transition.
#[derive(Debug, Clone)]
pub struct PreflightChecker {
    default_branch: String,
}

impl PreflightChecker {
    pub fn new(default_branch: impl Into<String>) -> Self {
        Self {
            default_branch: default_branch.into(),
        }
    }

    pub fn from_config(config: &EpicflowConfig) -> Self {
        Self::new(config.git.default_branch.clone())
    }

    /// Runs the checks in order: clean tree, not on the default branch, not
    /// behind the upstream. Being ahead is fine.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::PreflightFailed` with the first failing reason.
    pub fn check(&self, state: &BranchState) -> Result<()> {
        if !state.is_clean() {
            return Err(fail(PreflightFailure::DirtyWorkingTree {
                changes: state.changes.clone(),
            }));
        }

        if state.branch == self.default_branch {
            return Err(fail(PreflightFailure::OnDefaultBranch {
                branch: state.branch.clone(),
            }));
        }

        if let Some(divergence) = state.upstream
            && divergence.behind > 0
        {
            return Err(fail(PreflightFailure::BranchBehindRemote {
                behind: divergence.behind,
            }));
        }

        Ok(())
    }

    /// Reads the branch state and checks it.
    pub fn run(&self, config: &EpicflowConfig, git: &dyn GitAdapter) -> Result<BranchState> {
        let state = BranchState::read(config, git)?;
        self.check(&state)?;
        tracing::info!(branch = %state.branch, "preflight passed");
        Ok(state)
    }
}

fn fail(reason: PreflightFailure) -> EpicError {
    EpicError::PreflightFailed { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::git_mock::MockGitAdapter;
    use std::path::PathBuf;

    fn state(branch: &str, changes: &[&str], upstream: Option<Divergence>) -> BranchState {
        BranchState {
            branch: branch.to_string(),
            changes: changes.iter().map(|c| c.to_string()).collect(),
            upstream,
        }
    }

    fn reason(result: Result<()>) -> PreflightFailure {
        match result {
            Err(EpicError::PreflightFailed { reason }) => reason,
            other => panic!("expected preflight failure, got {other:?}"),
        }
    }

    #[test]
    fn test_passes_on_clean_feature_branch() {
        let checker = PreflightChecker::new("main");
        checker
            .check(&state("feature/checkout-flow", &[], None))
            .unwrap();
        checker
            .check(&state(
                "feature/checkout-flow",
                &[],
                Some(Divergence { ahead: 3, behind: 0 }),
            ))
            .unwrap();
    }

    #[test]
    fn test_dirty_tree_is_checked_first() {
        let checker = PreflightChecker::new("main");
        let failure = reason(checker.check(&state(
            "main",
            &["routes/web.php"],
            Some(Divergence { ahead: 0, behind: 2 }),
        )));
        assert_eq!(
            failure,
            PreflightFailure::DirtyWorkingTree {
                changes: vec!["routes/web.php".to_string()]
            }
        );
    }

    #[test]
    fn test_rejects_default_branch() {
        let checker = PreflightChecker::new("main");
        assert!(matches!(
            reason(checker.check(&state("main", &[], None))),
            PreflightFailure::OnDefaultBranch { .. }
        ));
    }

    #[test]
    fn test_rejects_branch_behind_remote() {
        let checker = PreflightChecker::new("main");
        let failure = reason(checker.check(&state(
            "feature/search",
            &[],
            Some(Divergence { ahead: 1, behind: 2 }),
        )));
        assert_eq!(failure, PreflightFailure::BranchBehindRemote { behind: 2 });
        assert_eq!(
            failure.to_string(),
            "branch is 2 commit(s) behind its upstream; pull first"
        );
    }

    #[test]
    fn test_read_fetches_and_tolerates_fetch_failure() {
        let config = EpicflowConfig::new(PathBuf::from("/repo"));
        let git = MockGitAdapter::with_repo("/repo");
        git.set_branch("feature/search");
        git.fail_fetch();

        let state = BranchState::read(&config, &git).unwrap();
        assert_eq!(state.branch, "feature/search");
        assert!(state.is_clean());
        assert_eq!(git.fetch_count(), 1);
    }

    #[test]
    fn test_read_skips_fetch_when_disabled() {
        let mut config = EpicflowConfig::new(PathBuf::from("/repo"));
        config.git.fetch_before_preflight = false;
        let git = MockGitAdapter::with_repo("/repo");

        BranchState::read(&config, &git).unwrap();
        assert_eq!(git.fetch_count(), 0);
    }

    #[test]
    fn test_dirty_message_lists_changes() {
        let failure = PreflightFailure::DirtyWorkingTree {
            changes: vec!["a.php".to_string(), "b.php".to_string()],
        };
        assert_eq!(
            failure.to_string(),
            "working tree has 2 uncommitted change(s)\n  a.php\n  b.php"
        );
    }
}
