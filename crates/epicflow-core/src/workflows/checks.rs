//! `start-checks`: tests, lint, typecheck.

use crate::error::Result;
use crate::tools::runner::{self, Step, StepReport, StepRunner};

/// Runs tests, lint and typecheck in that order, stopping at the first
/// failure.
///
/// # Errors
///
/// Returns `EpicError::ExternalStepFailed` with the failing tool's output.
#[tracing::instrument(skip_all)]
pub fn start_checks(runner: &dyn StepRunner) -> Result<Vec<StepReport>> {
    let reports = runner::run_sequence(runner, &Step::checks())?;
    tracing::info!("all checks passed");
    Ok(reports)
}
