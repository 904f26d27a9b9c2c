//! [`StepRunner`] backed by the configured shell commands and git.

use crate::config::EpicflowConfig;
use crate::error::Result;
use crate::tools::ToolRegistry;
use crate::tools::runner::{PrRequest, Step, StepOutcome, StepRunner};
use std::io::Write;

/// Runs steps against the real repository.
///
/// Check steps run the `[checks]` commands from the repository root. The
/// VCS steps go through the git adapter. Pull requests go through the `[pr]`
/// commands. Spawn, git and temp file errors become failed steps carrying
/// the error message.
pub struct ExternalRunner<'a> {
    config: &'a EpicflowConfig,
    tools: &'a ToolRegistry,
}

impl<'a> ExternalRunner<'a> {
    pub fn new(config: &'a EpicflowConfig, tools: &'a ToolRegistry) -> Self {
        Self { config, tools }
    }

    fn run_check(&self, cmd: &str) -> Result<StepOutcome> {
        if cmd.trim().is_empty() {
            tracing::info!("no command configured, skipping");
            return Ok(StepOutcome::Passed {
                output: "skipped".to_string(),
            });
        }

        let output = match self.tools.shell.run(cmd, Some(&self.config.repo_root)) {
            Ok(output) => output,
            Err(e) => return Ok(failed(e)),
        };
        Ok(if output.success() {
            StepOutcome::Passed {
                output: output.combined(),
            }
        } else {
            StepOutcome::Failed {
                output: output.combined(),
            }
        })
    }

    fn git_step(&self, result: Result<()>, passed: String) -> StepOutcome {
        match result {
            Ok(()) => StepOutcome::Passed { output: passed },
            Err(e) => failed(e),
        }
    }

    fn push(&self) -> StepOutcome {
        let root = &self.config.repo_root;
        let remote = &self.config.git.remote;
        let result = self
            .tools
            .git
            .current_branch(root)
            .and_then(|branch| {
                self.tools.git.push(root, remote, &branch)?;
                Ok(branch)
            });

        match result {
            Ok(branch) => StepOutcome::Passed {
                output: format!("pushed {} to {}", branch, remote),
            },
            Err(e) => StepOutcome::Failed {
                output: e.to_string(),
            },
        }
    }

    fn create_pr(&self, request: &PrRequest) -> StepOutcome {
        match self.try_create_pr(request) {
            Ok(outcome) => outcome,
            Err(e) => failed(e),
        }
    }

    fn try_create_pr(&self, request: &PrRequest) -> Result<StepOutcome> {
        let root = &self.config.repo_root;

        if let Some(url) = self.locate_pr()? {
            if request.draft {
                tracing::info!(%url, "pull request already open");
                return Ok(StepOutcome::Passed { output: url });
            }

            tracing::info!(%url, "marking existing pull request ready");
            let output = self.tools.shell.run(&self.config.pr.ready, Some(root))?;
            return Ok(if output.success() {
                StepOutcome::Passed { output: url }
            } else {
                StepOutcome::Failed {
                    output: output.combined(),
                }
            });
        }

        let mut body_file = tempfile::Builder::new()
            .prefix("epicflow-pr-body-")
            .suffix(".md")
            .tempfile()?;
        body_file.write_all(request.body.as_bytes())?;

        let body_path = body_file.path().to_string_lossy().to_string();
        let mut cmd = format!(
            "{} --base {} --title {} --body-file {}",
            self.config.pr.create,
            shell_words::quote(&self.config.git.default_branch),
            shell_words::quote(&request.title),
            shell_words::quote(&body_path),
        );
        if request.draft {
            cmd.push_str(" --draft");
        }

        let output = self.tools.shell.run(&cmd, Some(root))?;
        Ok(if output.success() {
            StepOutcome::Passed {
                output: output.stdout.trim().to_string(),
            }
        } else {
            StepOutcome::Failed {
                output: output.combined(),
            }
        })
    }
}

fn failed(err: impl std::fmt::Display) -> StepOutcome {
    tracing::warn!(error = %err, "step could not run");
    StepOutcome::Failed {
        output: err.to_string(),
    }
}

impl StepRunner for ExternalRunner<'_> {
    fn run(&self, step: &Step) -> Result<StepOutcome> {
        let root = &self.config.repo_root;
        let checks = &self.config.checks;

        match step {
            Step::Tests => self.run_check(&checks.tests),
            Step::Lint => self.run_check(&checks.lint),
            Step::Typecheck => self.run_check(&checks.typecheck),
            Step::VcsCommit { message } => Ok(self.git_step(
                self.tools.git.commit(root, message),
                format!("committed: {}", message),
            )),
            Step::VcsPush => Ok(self.push()),
            Step::PrCreate(request) => Ok(self.create_pr(request)),
        }
    }

    fn locate_pr(&self) -> Result<Option<String>> {
        let output = self
            .tools
            .shell
            .run(&self.config.pr.view, Some(&self.config.repo_root))?;
        let url = output.stdout.trim();

        if output.success() && url.starts_with("http") {
            Ok(Some(url.to_string()))
        } else {
            tracing::debug!("no pull request found for current branch");
            Ok(None)
        }
    }
}
