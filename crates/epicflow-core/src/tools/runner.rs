//! External step runner.
//!
//! The lifecycle never looks inside the project's check tools, version
//! control or pull-request host; it asks a [`StepRunner`] to run a [`Step`]
//! and gets back pass or fail plus whatever the step printed.

use crate::error::{EpicError, Result};
use std::fmt;

/// Identifies an external step in reports and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Project test suite.
    Tests,
    /// Linter / formatter check.
    Lint,
    /// Type checker.
    Typecheck,
    /// Stage everything and commit.
    VcsCommit,
    /// Push the current branch with upstream tracking.
    VcsPush,
    /// Open the pull request, or mark an existing one ready.
    PrCreate,
}

impl StepKind {
    /// Name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Tests => "tests",
            StepKind::Lint => "lint",
            StepKind::Typecheck => "typecheck",
            StepKind::VcsCommit => "vcs.commit",
            StepKind::VcsPush => "vcs.push",
            StepKind::PrCreate => "pr.create",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull request to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRequest {
    /// PR title.
    pub title: String,
    /// Rendered markdown body.
    pub body: String,
    /// Open as a draft.
    pub draft: bool,
}

/// One unit of external work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Tests,
    Lint,
    Typecheck,
    VcsCommit { message: String },
    VcsPush,
    PrCreate(PrRequest),
}

impl Step {
    /// The check steps, in the order they always run.
    pub fn checks() -> Vec<Step> {
        vec![Step::Tests, Step::Lint, Step::Typecheck]
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::Tests => StepKind::Tests,
            Step::Lint => StepKind::Lint,
            Step::Typecheck => StepKind::Typecheck,
            Step::VcsCommit { .. } => StepKind::VcsCommit,
            Step::VcsPush => StepKind::VcsPush,
            Step::PrCreate(_) => StepKind::PrCreate,
        }
    }
}

/// Result of running one step. Failure is data, not an error: the caller
/// decides whether it aborts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Passed { output: String },
    Failed { output: String },
}

impl StepOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, StepOutcome::Passed { .. })
    }

    pub fn output(&self) -> &str {
        match self {
            StepOutcome::Passed { output } | StepOutcome::Failed { output } => output,
        }
    }
}

/// A step that ran and passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: StepKind,
    pub output: String,
}

/// Runs external steps.
pub trait StepRunner {
    /// Runs one step and reports its outcome.
    ///
    /// # Errors
    ///
    /// Only for failures to run the step at all (for example a missing
    /// shell); a step that runs and fails is `Ok(StepOutcome::Failed)`.
    /// [`run_sequence`] reports both as a failure of the step.
    fn run(&self, step: &Step) -> Result<StepOutcome>;

    /// URL of the pull request for the current branch, if one exists.
    fn locate_pr(&self) -> Result<Option<String>>;
}

/// Runs `steps` in order and stops at the first failure.
///
/// # Errors
///
/// Returns `EpicError::ExternalStepFailed` naming the failed step with its
/// output, or with the error message when the step could not run at all;
/// later steps are never run.
pub fn run_sequence(runner: &dyn StepRunner, steps: &[Step]) -> Result<Vec<StepReport>> {
    let mut reports = Vec::with_capacity(steps.len());

    for step in steps {
        let kind = step.kind();
        tracing::info!(step = %kind, "running step");

        let outcome = runner.run(step).unwrap_or_else(|e| StepOutcome::Failed {
            output: e.to_string(),
        });

        match outcome {
            StepOutcome::Passed { output } => {
                tracing::debug!(step = %kind, "step passed");
                reports.push(StepReport { step: kind, output });
            }
            StepOutcome::Failed { output } => {
                tracing::warn!(step = %kind, "step failed");
                return Err(EpicError::ExternalStepFailed { step: kind, output });
            }
        }
    }

    Ok(reports)
}
