//! `complete-epic`: the `-> Complete` transition.

use crate::config::EpicflowConfig;
use crate::error::Result;
use crate::preflight::PreflightChecker;
use crate::state::EpicStatus;
use crate::store::DocumentStore;
use crate::tools::fs::FsAdapter;
use crate::tools::git::GitAdapter;
use crate::tools::runner::{self, Step, StepReport, StepRunner};
use crate::workflows::changelog::{self, ChangelogRequest};
use crate::workflows::pr;
use epicflow_templates::TemplateManager;
use serde::Serialize;
use std::path::PathBuf;

/// Inputs for [`complete_epic`].
#[derive(Debug, Clone, Default)]
pub struct CompleteRequest {
    pub changelog: ChangelogRequest,
    pub learnings: Vec<String>,
    /// Open the PR as a draft instead of ready for review.
    pub draft: bool,
}

/// Outcome of [`complete_epic`].
#[derive(Debug, Clone, Serialize)]
pub struct CompletedEpic {
    pub number: u32,
    pub slug: String,
    pub changelog_path: PathBuf,
    pub learnings_appended: usize,
    pub pr_url: String,
}

/// Completes an epic.
///
/// This workflow:
/// 1. Reads the PRD and validates the move to Complete
/// 2. Refuses an existing changelog unless forced
/// 3. Runs preflight: clean tree, not on the default branch, not behind
///    the upstream
/// 4. Runs tests, lint and typecheck
/// 5. Resolves the PR link, then writes the changelog, appends learnings
///    and sets the PRD status to Complete
/// 6. Commits everything, pushes, and opens the PR (or marks the existing
///    one ready)
///
/// Steps 1-4 write nothing, so a failure there leaves the repository as it
/// was. Failures in 5-6 stop immediately and are not rolled back; the
/// written documents stay for the operator to inspect.
///
/// # Errors
///
/// Returns:
/// - `EpicError::MissingPrd` before any other check
/// - `EpicError::InvalidStatusTransition` if the epic is already Complete
/// - `EpicError::AlreadyExists` for an existing changelog without `force`
/// - `EpicError::PreflightFailed` with the failing reason
/// - `EpicError::ExternalStepFailed` naming the failing step and its output
/// - `EpicError::MissingInput` if no PR link can be resolved
///
/// # Examples
///
/// ```no_run
/// use epicflow_core::{EpicflowConfig, ToolRegistry, workflows};
/// use epicflow_core::tools::runner_impl::ExternalRunner;
/// use epicflow_core::workflows::{ChangelogRequest, CompleteRequest};
/// use epicflow_templates::TemplateManager;
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = EpicflowConfig::load(PathBuf::from("/repo"))?;
/// let templates = TemplateManager::builtin();
/// let tools = ToolRegistry::standard();
/// let runner = ExternalRunner::new(&config, &tools);
///
/// let request = CompleteRequest {
///     changelog: ChangelogRequest {
///         slug: "checkout-flow".to_string(),
///         pr_link: Some("https://github.com/acme/shop/pull/42".to_string()),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// workflows::complete_epic(&config, &templates, &*tools.fs, &*tools.git, &runner, &request)?;
/// # Ok(())
/// # }
/// ```
#[tracing::instrument(skip_all, fields(epic_slug = %request.changelog.slug))]
pub fn complete_epic(
    config: &EpicflowConfig,
    templates: &TemplateManager,
    fs: &dyn FsAdapter,
    git: &dyn GitAdapter,
    runner: &dyn StepRunner,
    request: &CompleteRequest,
) -> Result<CompletedEpic> {
    let slug = request.changelog.slug.as_str();
    let store = DocumentStore::new(config, fs, templates);

    let prd = store.read_prd(slug)?;
    prd.status.validate_transition(EpicStatus::Complete)?;
    changelog::ensure_changelog_writable(config, &store, fs, &prd, request.changelog.force)?;

    PreflightChecker::from_config(config).run(config, git)?;
    runner::run_sequence(runner, &Step::checks())?;

    let changelog = changelog::build_changelog(config, git, runner, &prd, &request.changelog)?;
    let changelog_path = store.write_changelog(slug, &changelog, request.changelog.force)?;
    let learnings_appended = store.append_learnings(&request.learnings)?;
    store.set_status(slug, EpicStatus::Complete)?;

    let pr_request = pr::pr_request(config, templates, &store, fs, &prd, request.draft)?;
    let reports: Vec<StepReport> = runner::run_sequence(
        runner,
        &[
            Step::VcsCommit {
                message: format!("Complete epic {}: {}", prd.number, prd.title),
            },
            Step::VcsPush,
            Step::PrCreate(pr_request),
        ],
    )?;

    let pr_url = match pr::pr_url(&reports) {
        url if url.is_empty() => changelog.pr_link.clone(),
        url => url,
    };
    tracing::info!(epic_number = prd.number, %pr_url, "epic complete");

    Ok(CompletedEpic {
        number: prd.number,
        slug: prd.slug,
        changelog_path,
        learnings_appended,
        pr_url,
    })
}
