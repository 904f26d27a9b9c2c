//! Repository initialization.

use crate::config::{CONFIG_DIR, EpicflowConfig};
use crate::error::{EpicError, Result};
use crate::tools::fs::FsAdapter;
use crate::tools::git::GitAdapter;
use anyhow::Context;
use std::path::PathBuf;

/// Header written to a fresh learnings log.
pub const LEARNINGS_HEADER: &str = "# Learnings\n\n";

/// Initializes a repository for epicflow use.
///
/// This workflow:
/// 1. Verifies the directory is a git repository
/// 2. Creates `.epicflow/` with a default `config.toml` and an empty
///    `templates/` override directory
/// 3. Creates the PRD and changelog directories
/// 4. Creates the learnings log unless one already exists
///
/// Returns the paths it created.
///
/// # Errors
///
/// Returns:
/// - `EpicError::NotGitRepository` if the root is not a git repository
/// - `EpicError::AlreadyInitialized` if `.epicflow/` already exists
/// - `EpicError::FileWriteError` / `EpicError::PermissionDenied` on write failures
///
/// # Examples
///
/// ```no_run
/// use epicflow_core::{EpicflowConfig, workflows};
/// use epicflow_core::tools::fs_impl::StdFsAdapter;
/// use epicflow_core::tools::git_impl::StdGitAdapter;
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = EpicflowConfig::new(PathBuf::from("/repo"));
/// workflows::init_project(&config, &StdFsAdapter::new(), &StdGitAdapter::new())?;
/// # Ok(())
/// # }
/// ```
#[tracing::instrument(skip_all, fields(repo_root = %config.repo_root.display()))]
pub fn init_project(
    config: &EpicflowConfig,
    fs: &dyn FsAdapter,
    git: &dyn GitAdapter,
) -> Result<Vec<PathBuf>> {
    if !git.is_git_repo(&config.repo_root) {
        return Err(EpicError::NotGitRepository(config.repo_root.clone()));
    }

    let config_dir = config.repo_root.join(CONFIG_DIR);
    if fs.exists(&config_dir) {
        return Err(EpicError::AlreadyInitialized);
    }

    let mut created = Vec::new();

    fs.write(&config.config_file, &EpicflowConfig::default_file_contents())
        .context("failed to write config.toml")?;
    created.push(config.config_file.clone());

    for dir in [&config.template_dir, &config.prd_dir, &config.changelog_dir] {
        if !fs.is_dir(dir) {
            fs.create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            created.push(dir.clone());
        }
    }

    if !fs.exists(&config.learnings_file) {
        fs.write(&config.learnings_file, LEARNINGS_HEADER)
            .context("failed to create learnings log")?;
        created.push(config.learnings_file.clone());
    }

    tracing::info!(created = created.len(), "repository initialized");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fs_mock::MockFsAdapter;
    use crate::tools::git_mock::MockGitAdapter;
    use std::collections::HashMap;

    #[test]
    fn test_init_creates_layout() {
        let config = EpicflowConfig::new(PathBuf::from("/repo"));
        let fs = MockFsAdapter::new();
        let git = MockGitAdapter::with_repo("/repo");

        let created = init_project(&config, &fs, &git).unwrap();

        assert!(created.contains(&config.config_file));
        assert!(fs.is_dir(&config.prd_dir));
        assert!(fs.is_dir(&config.changelog_dir));
        assert!(fs.is_dir(&config.template_dir));
        assert_eq!(
            fs.read_to_string(&config.learnings_file).unwrap(),
            LEARNINGS_HEADER
        );
    }

    #[test]
    fn test_init_keeps_existing_learnings() {
        let config = EpicflowConfig::new(PathBuf::from("/repo"));
        let mut files = HashMap::new();
        files.insert(config.learnings_file.clone(), "- keep me\n".to_string());
        let fs = MockFsAdapter::with_files(files);
        let git = MockGitAdapter::with_repo("/repo");

        let created = init_project(&config, &fs, &git).unwrap();

        assert!(!created.contains(&config.learnings_file));
        assert_eq!(fs.read_to_string(&config.learnings_file).unwrap(), "- keep me\n");
    }

    #[test]
    fn test_init_twice() {
        let config = EpicflowConfig::new(PathBuf::from("/repo"));
        let fs = MockFsAdapter::new();
        let git = MockGitAdapter::with_repo("/repo");

        init_project(&config, &fs, &git).unwrap();
        assert!(matches!(
            init_project(&config, &fs, &git),
            Err(EpicError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_init_outside_git() {
        let config = EpicflowConfig::new(PathBuf::from("/repo"));
        let fs = MockFsAdapter::new();
        let git = MockGitAdapter::new();

        assert!(matches!(
            init_project(&config, &fs, &git),
            Err(EpicError::NotGitRepository(_))
        ));
        assert_eq!(fs.write_count(), 0);
    }
}
