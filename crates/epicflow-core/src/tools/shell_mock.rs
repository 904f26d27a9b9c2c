//! Mock shell adapter for testing.
//!
//! Outputs are registered per command line. A registered key also matches
//! any command that starts with it followed by a space, so tests can stub
//! `gh pr create` without knowing the temporary body-file path.

use crate::error::{EpicError, Result};
use crate::tools::shell::{CommandOutput, ShellAdapter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Command history entry: (command, working directory).
type CommandHistoryEntry = (String, Option<PathBuf>);

/// Mock shell adapter for testing.
///
/// # Examples
///
/// ```
/// use epicflow_core::tools::shell_mock::MockShellAdapter;
/// use epicflow_core::tools::shell::{CommandOutput, ShellAdapter};
///
/// let shell = MockShellAdapter::with_success();
/// shell.set_output("npm run types", CommandOutput::failed(2, "TS2322"));
///
/// assert!(shell.run("php artisan test", None).unwrap().success());
/// assert!(!shell.run("npm run types", None).unwrap().success());
/// assert_eq!(shell.command_count("npm run types"), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockShellAdapter {
    outputs: Arc<Mutex<HashMap<String, CommandOutput>>>,
    history: Arc<Mutex<Vec<CommandHistoryEntry>>>,
    default_output: Arc<Mutex<Option<CommandOutput>>>,
}

impl MockShellAdapter {
    /// Creates a mock that errors on every unregistered command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that succeeds silently on unregistered commands.
    pub fn with_success() -> Self {
        let adapter = Self::new();
        adapter.set_default_output(CommandOutput::ok(""));
        adapter
    }

    /// Registers the output for a command (or command prefix).
    pub fn set_output(&self, cmd: &str, output: CommandOutput) {
        self.outputs.lock().unwrap().insert(cmd.to_string(), output);
    }

    /// Sets the output for unregistered commands.
    pub fn set_default_output(&self, output: CommandOutput) {
        *self.default_output.lock().unwrap() = Some(output);
    }

    /// Returns the executed commands in order.
    pub fn get_history(&self) -> Vec<CommandHistoryEntry> {
        self.history.lock().unwrap().clone()
    }

    /// Returns just the command lines that were executed.
    pub fn commands(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .map(|(cmd, _)| cmd.clone())
            .collect()
    }

    /// Number of executed commands equal to `cmd` or starting with `cmd `.
    pub fn command_count(&self, cmd: &str) -> usize {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| matches_key(c, cmd))
            .count()
    }

    fn lookup(&self, cmd: &str) -> Option<CommandOutput> {
        let outputs = self.outputs.lock().unwrap();
        if let Some(output) = outputs.get(cmd) {
            return Some(output.clone());
        }
        outputs
            .iter()
            .filter(|(key, _)| matches_key(cmd, key))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, output)| output.clone())
    }
}

fn matches_key(cmd: &str, key: &str) -> bool {
    cmd == key
        || cmd
            .strip_prefix(key)
            .is_some_and(|rest| rest.starts_with(' '))
}

impl ShellAdapter for MockShellAdapter {
    fn run(&self, cmd: &str, cwd: Option<&Path>) -> Result<CommandOutput> {
        self.history
            .lock()
            .unwrap()
            .push((cmd.to_string(), cwd.map(|p| p.to_path_buf())));

        if let Some(output) = self.lookup(cmd) {
            return Ok(output);
        }

        self.default_output.lock().unwrap().clone().ok_or_else(|| {
            EpicError::ShellCommandFailed(format!("no output configured for command: {}", cmd))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_shell_exact_output() {
        let shell = MockShellAdapter::new();
        shell.set_output("echo hello", CommandOutput::ok("hello\n"));

        let output = shell.run("echo hello", None).unwrap();
        assert_eq!(output.stdout, "hello\n");
    }

    #[test]
    fn test_mock_shell_unknown_command_errors() {
        let shell = MockShellAdapter::new();
        assert!(matches!(
            shell.run("unknown command", None),
            Err(EpicError::ShellCommandFailed(_))
        ));
    }

    #[test]
    fn test_mock_shell_prefix_match() {
        let shell = MockShellAdapter::new();
        shell.set_output("gh pr create", CommandOutput::ok("https://example.test/pr/1\n"));
        shell.set_output(
            "gh pr create --draft",
            CommandOutput::ok("https://example.test/pr/2\n"),
        );

        let plain = shell
            .run("gh pr create --base main --body-file /tmp/x", None)
            .unwrap();
        assert_eq!(plain.stdout.trim(), "https://example.test/pr/1");

        let draft = shell.run("gh pr create --draft --base main", None).unwrap();
        assert_eq!(draft.stdout.trim(), "https://example.test/pr/2");

        // Not a word boundary.
        assert!(shell.run("gh pr createx", None).is_err());
    }

    #[test]
    fn test_mock_shell_history_and_count() {
        let shell = MockShellAdapter::with_success();

        shell.run("php artisan test", Some(Path::new("/repo"))).unwrap();
        shell.run("gh pr create --title x", None).unwrap();
        shell.run("php artisan test", None).unwrap();

        let history = shell.get_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].1, Some(PathBuf::from("/repo")));
        assert_eq!(shell.command_count("php artisan test"), 2);
        assert_eq!(shell.command_count("gh pr create"), 1);
        assert_eq!(shell.command_count("npm run types"), 0);
    }
}
