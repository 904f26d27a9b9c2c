//! Standard git adapter implementation.
//!
//! Runs the `git` binary via `std::process::Command`; failures carry the
//! command line and git's stderr.

use crate::error::{EpicError, Result};
use crate::tools::git::{Divergence, GitAdapter};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Standard git adapter using the `git` command-line tool.
///
/// For testing, use [`MockGitAdapter`](crate::tools::git_mock::MockGitAdapter).
#[derive(Debug, Default)]
pub struct StdGitAdapter;

impl StdGitAdapter {
    /// Creates a new standard git adapter.
    pub fn new() -> Self {
        Self
    }

    fn output(&self, args: &[&str], cwd: &Path) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| EpicError::GitCommandFailed(format!("failed to execute git: {}", e)))
    }

    /// Runs git and returns trimmed stdout, failing on a non-zero exit.
    fn run_git(&self, args: &[&str], cwd: &Path) -> Result<String> {
        let output = self.output(args, cwd)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(EpicError::GitCommandFailed(format!(
                "git {} failed: {}",
                args.join(" "),
                detail
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl GitAdapter for StdGitAdapter {
    fn is_git_repo(&self, path: &Path) -> bool {
        self.output(&["rev-parse", "--is-inside-work-tree"], path)
            .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).trim() == "true")
            .unwrap_or(false)
    }

    fn get_repo_root(&self, path: &Path) -> Result<PathBuf> {
        if !self.is_git_repo(path) {
            return Err(EpicError::NotGitRepository(path.to_path_buf()));
        }

        self.run_git(&["rev-parse", "--show-toplevel"], path)
            .map(PathBuf::from)
    }

    fn current_branch(&self, path: &Path) -> Result<String> {
        let branch = self.run_git(&["rev-parse", "--abbrev-ref", "HEAD"], path)?;
        if branch == "HEAD" {
            return Err(EpicError::GitCommandFailed(
                "HEAD is detached; check out a branch first".to_string(),
            ));
        }
        Ok(branch)
    }

    fn status(&self, path: &Path) -> Result<Vec<String>> {
        let output = self.run_git(&["status", "--porcelain"], path)?;

        Ok(output
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                // "XY path"
                line.split_whitespace()
                    .skip(1)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect())
    }

    fn fetch(&self, path: &Path, remote: &str) -> Result<()> {
        self.run_git(&["fetch", "--quiet", remote], path)?;
        Ok(())
    }

    fn upstream_divergence(&self, path: &Path) -> Result<Option<Divergence>> {
        let has_upstream = self
            .output(
                &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
                path,
            )?
            .status
            .success();
        if !has_upstream {
            return Ok(None);
        }

        let counts = self.run_git(&["rev-list", "--left-right", "--count", "HEAD...@{u}"], path)?;
        let mut parts = counts.split_whitespace().map(str::parse::<u32>);
        match (parts.next(), parts.next()) {
            (Some(Ok(ahead)), Some(Ok(behind))) => Ok(Some(Divergence { ahead, behind })),
            _ => Err(EpicError::GitCommandFailed(format!(
                "unexpected rev-list output: {}",
                counts
            ))),
        }
    }

    fn branch_exists(&self, path: &Path, branch: &str) -> bool {
        let reference = format!("refs/heads/{}", branch);
        self.output(&["rev-parse", "--verify", "--quiet", &reference], path)
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn create_branch(&self, path: &Path, branch: &str) -> Result<()> {
        if self.branch_exists(path, branch) {
            return Err(EpicError::BranchExists(branch.to_string()));
        }

        self.run_git(&["checkout", "-b", branch], path)?;
        Ok(())
    }

    fn commit(&self, path: &Path, message: &str) -> Result<()> {
        self.run_git(&["add", "-A"], path)?;

        if !self.has_uncommitted_changes(path)? {
            tracing::debug!("nothing to commit");
            return Ok(());
        }

        self.run_git(&["commit", "-m", message], path)?;
        Ok(())
    }

    fn push(&self, path: &Path, remote: &str, branch: &str) -> Result<()> {
        self.run_git(&["push", "--set-upstream", remote, branch], path)?;
        Ok(())
    }

    fn log_subjects(&self, path: &Path, base: &str) -> Result<Vec<String>> {
        let range = format!("{}..HEAD", base);
        let output = self.run_git(&["log", "--reverse", "--format=%s", &range], path)?;

        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
