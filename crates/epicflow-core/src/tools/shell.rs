//! Shell adapter trait.
//!
//! The check commands and the pull-request commands are opaque shell
//! strings from the configuration; [`ShellAdapter`] runs them and hands back
//! whatever they printed.

use crate::error::Result;
use std::path::Path;

/// Captured result of one shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (`-1` when the process was killed by a signal).
    pub exit_code: i32,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run that printed `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Checks if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout followed by stderr, trimmed; what gets shown to the operator
    /// when a step fails.
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim_end();
        let stderr = self.stderr.trim_end();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, true) => format!("exit code {}", self.exit_code),
            (false, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

/// Shell adapter trait.
pub trait ShellAdapter: Send + Sync {
    /// Runs a command line through the platform shell and waits for it.
    ///
    /// A non-zero exit code is not an error; check
    /// [`CommandOutput::success`].
    ///
    /// # Errors
    ///
    /// Returns `EpicError::ShellCommandFailed` if the process cannot be
    /// spawned at all.
    fn run(&self, cmd: &str, cwd: Option<&Path>) -> Result<CommandOutput>;
}
