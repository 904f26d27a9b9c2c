//! Standard shell adapter implementation.

use crate::error::{EpicError, Result};
use crate::tools::shell::{CommandOutput, ShellAdapter};
use std::path::Path;
use std::process::{Command, Stdio};

/// Shell adapter that spawns `sh -c` (`cmd /C` on Windows).
#[derive(Debug, Default)]
pub struct StdShellAdapter;

impl StdShellAdapter {
    /// Creates a new standard shell adapter.
    pub fn new() -> Self {
        Self
    }
}

impl ShellAdapter for StdShellAdapter {
    fn run(&self, cmd: &str, cwd: Option<&Path>) -> Result<CommandOutput> {
        #[cfg(unix)]
        let (shell, shell_arg) = ("sh", "-c");
        #[cfg(windows)]
        let (shell, shell_arg) = ("cmd", "/C");

        let mut command = Command::new(shell);
        command.arg(shell_arg).arg(cmd).stdin(Stdio::null());

        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        tracing::debug!(cmd, "running shell command");
        let output = command.output().map_err(|e| {
            EpicError::ShellCommandFailed(format!("failed to execute `{}`: {}", cmd, e))
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
