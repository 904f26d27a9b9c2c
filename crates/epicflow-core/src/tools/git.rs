//! Git adapter trait and operations.
//!
//! [`GitAdapter`] covers what the lifecycle needs from version control:
//! reading branch state for preflight, creating the epic branch, and the
//! commit/push half of completion.

use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How far the current branch has moved from its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Divergence {
    /// Local commits not on the upstream.
    pub ahead: u32,

    /// Upstream commits not in the local branch.
    pub behind: u32,
}

/// Git adapter trait.
///
/// Implementations either shell out to `git` or keep scripted state in
/// memory for tests.
pub trait GitAdapter: Send + Sync {
    /// Checks if `path` is inside a git work tree.
    fn is_git_repo(&self, path: &Path) -> bool;

    /// Top-level directory of the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::NotGitRepository` if `path` is not inside a
    /// repository.
    fn get_repo_root(&self, path: &Path) -> Result<PathBuf>;

    /// Name of the checked-out branch.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::GitCommandFailed` on a detached HEAD or when git
    /// fails.
    fn current_branch(&self, path: &Path) -> Result<String>;

    /// Porcelain status entries (untracked, modified and staged paths).
    ///
    /// # Errors
    ///
    /// Returns `EpicError::GitCommandFailed` if the git command fails.
    fn status(&self, path: &Path) -> Result<Vec<String>>;

    /// Whether the work tree has any untracked, modified or staged change.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::GitCommandFailed` if the git command fails.
    fn has_uncommitted_changes(&self, path: &Path) -> Result<bool> {
        Ok(!self.status(path)?.is_empty())
    }

    /// Fetches `remote` so upstream comparisons see its latest state.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::GitCommandFailed` if the fetch fails.
    fn fetch(&self, path: &Path, remote: &str) -> Result<()>;

    /// Ahead/behind counts against the branch's upstream, or `None` when
    /// the branch tracks nothing.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::GitCommandFailed` if the counts cannot be read.
    fn upstream_divergence(&self, path: &Path) -> Result<Option<Divergence>>;

    /// Checks if a local branch exists.
    fn branch_exists(&self, path: &Path, branch: &str) -> bool;

    /// Creates `branch` from HEAD and checks it out.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::BranchExists` if the branch already exists and
    /// `EpicError::GitCommandFailed` if git fails.
    fn create_branch(&self, path: &Path, branch: &str) -> Result<()>;

    /// Stages every change and commits it. Does nothing when the tree is
    /// already clean.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::GitCommandFailed` if staging or committing fails
    /// (including a rejecting hook).
    fn commit(&self, path: &Path, message: &str) -> Result<()>;

    /// Pushes `branch` to `remote` and sets it as the upstream.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::GitCommandFailed` if the push is rejected.
    fn push(&self, path: &Path, remote: &str, branch: &str) -> Result<()>;

    /// Subjects of the commits in `base..HEAD`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::GitCommandFailed` if `base` cannot be resolved.
    fn log_subjects(&self, path: &Path, base: &str) -> Result<Vec<String>>;
}
