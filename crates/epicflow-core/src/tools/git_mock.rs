//! Mock git adapter for testing.
//!
//! Scripted repository state: one current branch, a dirty/clean flag, an
//! optional upstream divergence and the commit subjects `log_subjects`
//! reports. Commits, pushes and fetches are recorded for assertions.

use crate::error::{EpicError, Result};
use crate::tools::git::{Divergence, GitAdapter};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct MockRepo {
    root: Option<PathBuf>,
    branch: String,
    branches: BTreeSet<String>,
    dirty: Vec<String>,
    divergence: Option<Divergence>,
    subjects: Vec<String>,
    commits: Vec<String>,
    pushes: Vec<(String, String)>,
    fetches: usize,
    fail_commit: Option<String>,
    fail_push: Option<String>,
    fail_fetch: bool,
}

/// Mock git adapter for testing.
///
/// # Examples
///
/// ```
/// use epicflow_core::tools::git_mock::MockGitAdapter;
/// use epicflow_core::tools::git::GitAdapter;
/// use std::path::Path;
///
/// let git = MockGitAdapter::with_repo("/repo");
/// git.set_branch("feature/checkout-flow");
/// git.set_dirty(&["app/Http/Controllers/CheckoutController.php"]);
///
/// let root = Path::new("/repo");
/// assert_eq!(git.current_branch(root).unwrap(), "feature/checkout-flow");
/// assert!(git.has_uncommitted_changes(root).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockGitAdapter {
    state: Arc<Mutex<MockRepo>>,
}

impl MockGitAdapter {
    /// Creates a mock with no repository; every call reports
    /// `NotGitRepository`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clean repository rooted at `root` on branch `main`.
    pub fn with_repo(root: impl Into<PathBuf>) -> Self {
        let adapter = Self::new();
        {
            let mut state = adapter.state.lock().unwrap();
            state.root = Some(root.into());
            state.branch = "main".to_string();
            state.branches.insert("main".to_string());
        }
        adapter
    }

    /// Checks out `branch`, creating it if needed.
    pub fn set_branch(&self, branch: &str) {
        let mut state = self.state.lock().unwrap();
        state.branch = branch.to_string();
        state.branches.insert(branch.to_string());
    }

    /// Marks the given paths as uncommitted changes.
    pub fn set_dirty(&self, paths: &[&str]) {
        self.state.lock().unwrap().dirty = paths.iter().map(|p| p.to_string()).collect();
    }

    /// Sets the upstream divergence (`None` for no upstream).
    pub fn set_divergence(&self, divergence: Option<Divergence>) {
        self.state.lock().unwrap().divergence = divergence;
    }

    /// Sets the subjects `log_subjects` returns.
    pub fn set_subjects(&self, subjects: &[&str]) {
        self.state.lock().unwrap().subjects = subjects.iter().map(|s| s.to_string()).collect();
    }

    /// Makes the next commits fail with `message`.
    pub fn fail_commit(&self, message: &str) {
        self.state.lock().unwrap().fail_commit = Some(message.to_string());
    }

    /// Makes pushes fail with `message`.
    pub fn fail_push(&self, message: &str) {
        self.state.lock().unwrap().fail_push = Some(message.to_string());
    }

    /// Makes fetches fail.
    pub fn fail_fetch(&self) {
        self.state.lock().unwrap().fail_fetch = true;
    }

    /// Messages of the commits made so far.
    pub fn commits(&self) -> Vec<String> {
        self.state.lock().unwrap().commits.clone()
    }

    /// (remote, branch) pairs pushed so far.
    pub fn pushes(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().pushes.clone()
    }

    /// Number of fetches.
    pub fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches
    }

    fn check_repo(&self, path: &Path) -> Result<()> {
        match &self.state.lock().unwrap().root {
            Some(root) if path.starts_with(root) => Ok(()),
            _ => Err(EpicError::NotGitRepository(path.to_path_buf())),
        }
    }
}

impl GitAdapter for MockGitAdapter {
    fn is_git_repo(&self, path: &Path) -> bool {
        self.check_repo(path).is_ok()
    }

    fn get_repo_root(&self, path: &Path) -> Result<PathBuf> {
        self.check_repo(path)?;
        self.state
            .lock()
            .unwrap()
            .root
            .clone()
            .ok_or_else(|| EpicError::NotGitRepository(path.to_path_buf()))
    }

    fn current_branch(&self, path: &Path) -> Result<String> {
        self.check_repo(path)?;
        Ok(self.state.lock().unwrap().branch.clone())
    }

    fn status(&self, path: &Path) -> Result<Vec<String>> {
        self.check_repo(path)?;
        Ok(self.state.lock().unwrap().dirty.clone())
    }

    fn fetch(&self, path: &Path, remote: &str) -> Result<()> {
        self.check_repo(path)?;
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        if state.fail_fetch {
            return Err(EpicError::GitCommandFailed(format!(
                "git fetch {} failed: could not resolve host",
                remote
            )));
        }
        Ok(())
    }

    fn upstream_divergence(&self, path: &Path) -> Result<Option<Divergence>> {
        self.check_repo(path)?;
        Ok(self.state.lock().unwrap().divergence)
    }

    fn branch_exists(&self, _path: &Path, branch: &str) -> bool {
        self.state.lock().unwrap().branches.contains(branch)
    }

    fn create_branch(&self, path: &Path, branch: &str) -> Result<()> {
        self.check_repo(path)?;
        let mut state = self.state.lock().unwrap();
        if !state.branches.insert(branch.to_string()) {
            return Err(EpicError::BranchExists(branch.to_string()));
        }
        state.branch = branch.to_string();
        state.divergence = None;
        Ok(())
    }

    fn commit(&self, path: &Path, message: &str) -> Result<()> {
        self.check_repo(path)?;
        let mut state = self.state.lock().unwrap();
        if let Some(err) = &state.fail_commit {
            return Err(EpicError::GitCommandFailed(format!(
                "git commit -m {} failed: {}",
                message, err
            )));
        }
        state.dirty.clear();
        state.commits.push(message.to_string());
        if let Some(divergence) = state.divergence.as_mut() {
            divergence.ahead += 1;
        }
        Ok(())
    }

    fn push(&self, path: &Path, remote: &str, branch: &str) -> Result<()> {
        self.check_repo(path)?;
        let mut state = self.state.lock().unwrap();
        if let Some(err) = &state.fail_push {
            return Err(EpicError::GitCommandFailed(format!(
                "git push --set-upstream {} {} failed: {}",
                remote, branch, err
            )));
        }
        state.pushes.push((remote.to_string(), branch.to_string()));
        state.divergence = Some(Divergence::default());
        Ok(())
    }

    fn log_subjects(&self, path: &Path, _base: &str) -> Result<Vec<String>> {
        self.check_repo(path)?;
        let state = self.state.lock().unwrap();
        let mut subjects = state.subjects.clone();
        subjects.extend(state.commits.iter().cloned());
        Ok(subjects)
    }
}
