//! `create-changelog` and `document-epic`.
//!
//! Both need a PR link. It is taken from the request or looked up for the
//! current branch; without one the workflow stops with `MissingInput`
//! instead of writing a placeholder.

use crate::config::EpicflowConfig;
use crate::document::{ChangelogDocument, PrdDocument};
use crate::error::{EpicError, Result};
use crate::store::DocumentStore;
use crate::tools::fs::FsAdapter;
use crate::tools::git::GitAdapter;
use crate::tools::runner::StepRunner;
use epicflow_templates::TemplateManager;
use serde::Serialize;
use std::path::PathBuf;

/// Inputs for a changelog. Everything but the slug has a fallback.
#[derive(Debug, Clone, Default)]
pub struct ChangelogRequest {
    pub slug: String,
    /// PR URL; located through the runner when absent.
    pub pr_link: Option<String>,
    /// Defaults to the PRD objective.
    pub summary: Option<String>,
    /// Defaults to the commit subjects since the default branch.
    pub key_changes: Vec<String>,
    /// Overwrite an existing changelog.
    pub force: bool,
}

/// Outcome of [`document_epic`].
#[derive(Debug, Clone, Serialize)]
pub struct DocumentedEpic {
    pub changelog_path: PathBuf,
    pub learnings_appended: usize,
}

/// Fails with `AlreadyExists` when the changelog is present and `force`
/// is off.
pub(crate) fn ensure_changelog_writable(
    config: &EpicflowConfig,
    store: &DocumentStore<'_>,
    fs: &dyn FsAdapter,
    prd: &PrdDocument,
    force: bool,
) -> Result<()> {
    let path = store.changelog_path(prd);
    if !force && fs.exists(&path) {
        return Err(EpicError::AlreadyExists(config.relative(&path).to_path_buf()));
    }
    Ok(())
}

/// Resolves the request's fallbacks into a changelog dated today.
pub(crate) fn build_changelog(
    config: &EpicflowConfig,
    git: &dyn GitAdapter,
    runner: &dyn StepRunner,
    prd: &PrdDocument,
    request: &ChangelogRequest,
) -> Result<ChangelogDocument> {
    let pr_link = match request.pr_link.as_deref().map(str::trim) {
        Some(link) if !link.is_empty() => link.to_string(),
        _ => runner.locate_pr()?.ok_or_else(|| {
            EpicError::MissingInput(
                "pull request link (pass --pr or open a pull request for this branch)".to_string(),
            )
        })?,
    };

    let summary = request
        .summary
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| prd.objective.clone());

    let key_changes = if request.key_changes.is_empty() {
        let base = &config.git.default_branch;
        match git.log_subjects(&config.repo_root, base) {
            Ok(subjects) => subjects,
            Err(e) => {
                tracing::warn!(%base, error = %e, "could not read commit subjects");
                Vec::new()
            }
        }
    } else {
        request.key_changes.clone()
    };

    ChangelogDocument::new(
        prd,
        chrono::Local::now().date_naive(),
        &pr_link,
        &summary,
        key_changes,
    )
}

/// Writes the changelog for an epic.
///
/// This workflow:
/// 1. Reads the PRD (nothing happens without one)
/// 2. Refuses to overwrite an existing changelog unless `force` is set
/// 3. Resolves the PR link, summary and key changes
/// 4. Renders and writes `docs/changelog/NNN-<slug>.md`
///
/// # Errors
///
/// Returns:
/// - `EpicError::MissingPrd` if the epic has no PRD
/// - `EpicError::AlreadyExists` if the changelog exists and `force` is off
/// - `EpicError::MissingInput` if no PR link can be found or no key
///   changes are available
#[tracing::instrument(skip_all, fields(epic_slug = %request.slug))]
pub fn create_changelog(
    config: &EpicflowConfig,
    templates: &TemplateManager,
    fs: &dyn FsAdapter,
    git: &dyn GitAdapter,
    runner: &dyn StepRunner,
    request: &ChangelogRequest,
) -> Result<PathBuf> {
    let store = DocumentStore::new(config, fs, templates);
    let prd = store.read_prd(&request.slug)?;

    ensure_changelog_writable(config, &store, fs, &prd, request.force)?;
    let changelog = build_changelog(config, git, runner, &prd, request)?;

    store.write_changelog(&request.slug, &changelog, request.force)
}

/// Writes the changelog and appends learnings.
///
/// # Errors
///
/// Same as [`create_changelog`]; learnings are only appended after the
/// changelog was written.
#[tracing::instrument(skip_all, fields(epic_slug = %request.slug))]
pub fn document_epic(
    config: &EpicflowConfig,
    templates: &TemplateManager,
    fs: &dyn FsAdapter,
    git: &dyn GitAdapter,
    runner: &dyn StepRunner,
    request: &ChangelogRequest,
    learnings: &[String],
) -> Result<DocumentedEpic> {
    let changelog_path = create_changelog(config, templates, fs, git, runner, request)?;

    let store = DocumentStore::new(config, fs, templates);
    let learnings_appended = store.append_learnings(learnings)?;

    Ok(DocumentedEpic {
        changelog_path,
        learnings_appended,
    })
}
