//! Tool adapters and registry.
//!
//! Each adapter trait covers one category of side effect (file system, git,
//! shell) and comes with a `std`-backed implementation and an in-memory
//! mock. [`runner`] builds the lifecycle's external steps on top of them.

pub mod fs;
pub mod fs_impl;
pub mod fs_mock;
pub mod git;
pub mod git_impl;
pub mod git_mock;
pub mod runner;
pub mod runner_impl;
pub mod runner_mock;
pub mod shell;
pub mod shell_impl;
pub mod shell_mock;

use fs_impl::StdFsAdapter;
use git_impl::StdGitAdapter;
use shell_impl::StdShellAdapter;

/// Tool registry that owns one adapter per category.
///
/// Adapters are trait objects so tests can swap in the mocks.
pub struct ToolRegistry {
    /// File system adapter for document reads and writes.
    pub fs: Box<dyn fs::FsAdapter>,

    /// Git adapter for branch state, commits and pushes.
    pub git: Box<dyn git::GitAdapter>,

    /// Shell adapter for check and pull-request commands.
    pub shell: Box<dyn shell::ShellAdapter>,
}

impl ToolRegistry {
    /// Creates a new tool registry with the provided adapters.
    pub fn new(
        fs: Box<dyn fs::FsAdapter>,
        git: Box<dyn git::GitAdapter>,
        shell: Box<dyn shell::ShellAdapter>,
    ) -> Self {
        Self { fs, git, shell }
    }

    /// Registry over the real file system, `git` and `sh`.
    pub fn standard() -> Self {
        Self::new(
            Box::new(StdFsAdapter::new()),
            Box::new(StdGitAdapter::new()),
            Box::new(StdShellAdapter::new()),
        )
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("fs", &"Box<dyn FsAdapter>")
            .field("git", &"Box<dyn GitAdapter>")
            .field("shell", &"Box<dyn ShellAdapter>")
            .finish()
    }
}
