//! Read-only views: `list` and `status`.

use crate::config::EpicflowConfig;
use crate::error::Result;
use crate::state::{EpicStatus, EpicSummary};
use crate::store::DocumentStore;
use crate::tools::fs::FsAdapter;
use chrono::NaiveDate;
use epicflow_templates::TemplateManager;
use serde::Serialize;
use std::path::PathBuf;

/// Header fields of one epic plus where its documents live.
#[derive(Debug, Clone, Serialize)]
pub struct EpicDetails {
    pub number: u32,
    pub slug: String,
    pub title: String,
    pub status: EpicStatus,
    pub created: NaiveDate,
    pub branch: String,
    pub prd_path: PathBuf,
    pub changelog_path: Option<PathBuf>,
}

/// Every epic with a readable PRD, by number.
pub fn list_epics(
    config: &EpicflowConfig,
    templates: &TemplateManager,
    fs: &dyn FsAdapter,
) -> Result<Vec<EpicSummary>> {
    DocumentStore::new(config, fs, templates).list_epics()
}

/// Details of one epic.
///
/// # Errors
///
/// Returns `EpicError::MissingPrd` if the epic has no PRD.
pub fn epic_status(
    config: &EpicflowConfig,
    templates: &TemplateManager,
    fs: &dyn FsAdapter,
    slug: &str,
) -> Result<EpicDetails> {
    let store = DocumentStore::new(config, fs, templates);
    let prd = store.read_prd(slug)?;
    let prd_path = store
        .prd_path(slug)?
        .map(|p| config.relative(&p).to_path_buf())
        .unwrap_or_default();
    let changelog = store.changelog_path(&prd);
    let changelog_path = fs
        .exists(&changelog)
        .then(|| config.relative(&changelog).to_path_buf());

    Ok(EpicDetails {
        number: prd.number,
        branch: config.branch_name(prd.number, &prd.slug),
        slug: prd.slug,
        title: prd.title,
        status: prd.status,
        created: prd.created,
        prd_path,
        changelog_path,
    })
}
