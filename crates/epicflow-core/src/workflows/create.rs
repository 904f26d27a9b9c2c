//! Epic creation: `none -> Draft`.

use crate::config::EpicflowConfig;
use crate::document::{self, PrdDocument};
use crate::error::{EpicError, Result};
use crate::interview::{self, InterviewAnswers};
use crate::preflight::PreflightFailure;
use crate::store::DocumentStore;
use crate::tools::fs::FsAdapter;
use crate::tools::git::GitAdapter;
use epicflow_templates::TemplateManager;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of [`create_epic`].
#[derive(Debug, Clone, Serialize)]
pub struct CreatedEpic {
    pub number: u32,
    pub slug: String,
    pub branch: String,
    pub prd_path: PathBuf,
}

/// Derives and checks the slug for a new epic without touching anything.
///
/// # Errors
///
/// Returns `EpicError::MissingInput` for a blank name,
/// `EpicError::InvalidEpicSlug` if no valid slug can be derived and
/// `EpicError::EpicAlreadyExists` if a PRD already uses it.
pub fn new_epic_slug(store: &DocumentStore<'_>, name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(EpicError::MissingInput("epic name".to_string()));
    }

    let slug = document::slugify(name);
    document::validate_epic_slug(&slug)?;

    if store.exists(&slug) {
        return Err(EpicError::EpicAlreadyExists(slug));
    }
    Ok(slug)
}

/// Creates a new epic from interview answers.
///
/// This workflow:
/// 1. Derives the slug from `name` and rejects one already in use
/// 2. Assigns the next epic number from the PRD directory
/// 3. Builds the PRD from `answers`
/// 4. Refuses a dirty working tree, then creates and checks out the epic
///    branch
/// 5. Writes the PRD with status Draft
///
/// Nothing is written unless every step before the PRD write succeeded.
///
/// # Errors
///
/// Returns:
/// - `EpicError::MissingInput` for a blank name or a missing required answer
/// - `EpicError::EpicAlreadyExists` if the slug is taken
/// - `EpicError::PreflightFailed` (`DirtyWorkingTree`) on uncommitted changes
/// - `EpicError::BranchExists` if the epic branch already exists
#[tracing::instrument(skip_all, fields(epic_name = %name))]
pub fn create_epic(
    config: &EpicflowConfig,
    templates: &TemplateManager,
    fs: &dyn FsAdapter,
    git: &dyn GitAdapter,
    name: &str,
    answers: InterviewAnswers,
) -> Result<CreatedEpic> {
    let store = DocumentStore::new(config, fs, templates);

    let slug = new_epic_slug(&store, name)?;
    let number = store.next_epic_number()?;
    let prd: PrdDocument = interview::build_prd(number, &slug, name, answers)?;

    let changes = git.status(&config.repo_root)?;
    if !changes.is_empty() {
        return Err(EpicError::PreflightFailed {
            reason: PreflightFailure::DirtyWorkingTree { changes },
        });
    }

    let branch = config.branch_name(number, &slug);
    git.create_branch(&config.repo_root, &branch)?;
    tracing::info!(%branch, "epic branch created");

    let prd_path = store.write_prd(&prd)?;
    tracing::info!(epic_number = number, epic_slug = %slug, "epic created");

    Ok(CreatedEpic {
        number,
        slug,
        branch,
        prd_path,
    })
}
