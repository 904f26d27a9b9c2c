//! `create-pr`: push the epic branch and open its pull request.

use crate::config::EpicflowConfig;
use crate::document::PrdDocument;
use crate::error::{EpicError, Result};
use crate::store::DocumentStore;
use crate::tools::fs::FsAdapter;
use crate::tools::git::GitAdapter;
use crate::tools::runner::{self, PrRequest, Step, StepKind, StepReport, StepRunner};
use epicflow_templates::{TemplateEngine, TemplateManager, builtin};
use serde::Serialize;

#[derive(Serialize)]
struct PrBodyContext<'a> {
    number: u32,
    title: &'a str,
    objective: &'a str,
    changelog_path: Option<String>,
}

/// Builds the PR title and rendered body for an epic. The body links the
/// changelog when one has been written.
pub fn pr_request(
    config: &EpicflowConfig,
    templates: &TemplateManager,
    store: &DocumentStore<'_>,
    fs: &dyn FsAdapter,
    prd: &PrdDocument,
    draft: bool,
) -> Result<PrRequest> {
    let changelog = store.changelog_path(prd);
    let changelog_path = fs
        .exists(&changelog)
        .then(|| config.relative(&changelog).display().to_string());

    let body = templates.render(
        builtin::PR_BODY,
        &PrBodyContext {
            number: prd.number,
            title: &prd.title,
            objective: &prd.objective,
            changelog_path,
        },
    )?;

    Ok(PrRequest {
        title: format!("Epic {}: {}", prd.number, prd.title),
        body,
        draft,
    })
}

/// Finds the epic whose branch is checked out, by matching every PRD's
/// branch name against the current branch.
pub fn epic_for_current_branch(
    config: &EpicflowConfig,
    store: &DocumentStore<'_>,
    git: &dyn GitAdapter,
) -> Result<PrdDocument> {
    let branch = git.current_branch(&config.repo_root)?;

    let epic = store
        .list_epics()?
        .into_iter()
        .find(|epic| config.branch_name(epic.number, &epic.slug) == branch)
        .ok_or_else(|| EpicError::MissingPrd(format!("no epic uses branch `{}`", branch)))?;

    store.read_prd(&epic.slug)
}

/// Pushes the current branch and opens (or readies) its pull request.
///
/// The epic is `slug` when given, otherwise the one whose branch is checked
/// out. Returns the PR URL reported by the PR step.
///
/// # Errors
///
/// Returns `EpicError::MissingPrd` if no epic matches and
/// `EpicError::ExternalStepFailed` for a rejected push or PR command.
#[tracing::instrument(skip_all, fields(epic_slug = slug.unwrap_or("<current branch>")))]
pub fn create_pr(
    config: &EpicflowConfig,
    templates: &TemplateManager,
    fs: &dyn FsAdapter,
    git: &dyn GitAdapter,
    runner: &dyn StepRunner,
    slug: Option<&str>,
    draft: bool,
) -> Result<String> {
    let store = DocumentStore::new(config, fs, templates);
    let prd = match slug {
        Some(slug) => store.read_prd(slug)?,
        None => epic_for_current_branch(config, &store, git)?,
    };

    let request = pr_request(config, templates, &store, fs, &prd, draft)?;
    let reports = runner::run_sequence(runner, &[Step::VcsPush, Step::PrCreate(request)])?;

    Ok(pr_url(&reports))
}

/// URL printed by the `pr.create` step.
pub(crate) fn pr_url(reports: &[StepReport]) -> String {
    reports
        .iter()
        .rev()
        .find(|r| r.step == StepKind::PrCreate)
        .map(|r| r.output.trim().to_string())
        .unwrap_or_default()
}
