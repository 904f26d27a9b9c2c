//! Document store.
//!
//! PRDs and changelogs live at `<dir>/NNN-<slug>.md`; the learnings log is a
//! single append-only markdown file. Epic numbers are derived from the PRD
//! file names on every call, never cached. Two processes creating epics at
//! the same moment can therefore pick the same number.

use crate::config::EpicflowConfig;
use crate::document::{self, ChangelogDocument, PrdDocument};
use crate::error::{EpicError, Result};
use crate::state::{EpicStatus, EpicSummary};
use crate::tools::fs::FsAdapter;
use epicflow_templates::TemplateManager;
use std::path::PathBuf;

/// Reads and writes epic documents through an [`FsAdapter`].
pub struct DocumentStore<'a> {
    config: &'a EpicflowConfig,
    fs: &'a dyn FsAdapter,
    templates: &'a TemplateManager,
}

impl<'a> DocumentStore<'a> {
    pub fn new(
        config: &'a EpicflowConfig,
        fs: &'a dyn FsAdapter,
        templates: &'a TemplateManager,
    ) -> Self {
        Self {
            config,
            fs,
            templates,
        }
    }

    /// PRD file names in the PRD directory as (number, slug, file name).
    /// A missing directory yields nothing; unparsable names are skipped.
    fn prd_entries(&self) -> Result<Vec<(u32, String, String)>> {
        let names = match self.fs.list_dir(&self.config.prd_dir) {
            Ok(names) => names,
            Err(EpicError::PathNotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entries: Vec<_> = names
            .into_iter()
            .filter_map(|name| {
                let parsed = document::parse_file_name(&name)
                    .map(|(number, slug)| (number, slug.to_string()));
                if parsed.is_none() {
                    tracing::debug!(file = %name, "skipping non-PRD file");
                }
                parsed.map(|(number, slug)| (number, slug, name))
            })
            .collect();
        entries.sort();
        Ok(entries)
    }

    /// Path of the PRD for `slug`, if one exists.
    pub fn prd_path(&self, slug: &str) -> Result<Option<PathBuf>> {
        Ok(self
            .prd_entries()?
            .into_iter()
            .find(|(_, s, _)| s == slug)
            .map(|(_, _, name)| self.config.prd_dir.join(name)))
    }

    /// Path a changelog for this PRD is written to.
    pub fn changelog_path(&self, prd: &PrdDocument) -> PathBuf {
        self.config
            .changelog_dir
            .join(document::document_file_name(prd.number, &prd.slug))
    }

    /// True iff a PRD document is present for the slug.
    pub fn exists(&self, slug: &str) -> bool {
        matches!(self.prd_path(slug), Ok(Some(_)))
    }

    /// Reads and parses the PRD for `slug`.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::MissingPrd` if there is none and
    /// `EpicError::InvalidDocument` if it cannot be parsed.
    pub fn read_prd(&self, slug: &str) -> Result<PrdDocument> {
        let path = self
            .prd_path(slug)?
            .ok_or_else(|| EpicError::MissingPrd(slug.to_string()))?;
        let content = self.fs.read_to_string(&path)?;
        PrdDocument::parse(&path, &content)
    }

    /// Renders and writes a PRD, replacing any existing file.
    pub fn write_prd(&self, prd: &PrdDocument) -> Result<PathBuf> {
        let path = self
            .config
            .prd_dir
            .join(document::document_file_name(prd.number, &prd.slug));
        let rendered = prd.render(self.templates)?;
        self.fs.write(&path, &rendered)?;

        tracing::info!(epic_slug = %prd.slug, path = %self.config.relative(&path).display(), "PRD written");
        Ok(path)
    }

    /// Writes the changelog for `slug`.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::MissingPrd` when the epic has no PRD and
    /// `EpicError::AlreadyExists` when the changelog exists and `force` is
    /// false.
    pub fn write_changelog(
        &self,
        slug: &str,
        changelog: &ChangelogDocument,
        force: bool,
    ) -> Result<PathBuf> {
        let prd = self.read_prd(slug)?;
        let path = self.changelog_path(&prd);

        if self.fs.exists(&path) {
            if !force {
                return Err(EpicError::AlreadyExists(self.config.relative(&path).to_path_buf()));
            }
            tracing::warn!(path = %path.display(), "overwriting existing changelog");
        }

        let rendered = changelog.render(self.templates)?;
        self.fs.write(&path, &rendered)?;

        tracing::info!(epic_slug = %slug, path = %self.config.relative(&path).display(), "changelog written");
        Ok(path)
    }

    /// Appends one `- entry` line per non-blank entry to the learnings log.
    ///
    /// Existing content is never rewritten; a missing trailing newline is
    /// completed before the first new bullet. Returns the number of bullets
    /// appended.
    pub fn append_learnings(&self, entries: &[String]) -> Result<usize> {
        let bullets: Vec<String> = entries
            .iter()
            .map(|e| e.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|e| !e.is_empty())
            .map(|e| format!("- {}\n", e))
            .collect();

        if bullets.is_empty() {
            return Ok(0);
        }

        let path = &self.config.learnings_file;
        self.fs.append(path, &bullets.concat())?;
        tracing::info!(count = bullets.len(), "learnings appended");
        Ok(bullets.len())
    }

    /// Highest PRD number on disk plus one, or 1 when there are none.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::InvalidDocument` naming the highest PRD when its
    /// number is already `u32::MAX`.
    pub fn next_epic_number(&self) -> Result<u32> {
        let Some((max, _, name)) = self.prd_entries()?.pop() else {
            return Ok(1);
        };

        max.checked_add(1).ok_or_else(|| EpicError::InvalidDocument {
            path: self.config.prd_dir.join(name),
            reason: format!("epic number {} has no successor", max),
        })
    }

    /// Moves the epic to `status`, rewriting only the PRD's status line.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::MissingPrd` if there is no PRD and
    /// `EpicError::InvalidStatusTransition` if the lifecycle forbids it.
    pub fn set_status(&self, slug: &str, status: EpicStatus) -> Result<()> {
        let path = self
            .prd_path(slug)?
            .ok_or_else(|| EpicError::MissingPrd(slug.to_string()))?;
        let content = self.fs.read_to_string(&path)?;
        let current = PrdDocument::parse(&path, &content)?.status;

        current.validate_transition(status)?;

        let updated = document::replace_status_line(&content, status).ok_or_else(|| {
            EpicError::InvalidDocument {
                path: path.clone(),
                reason: "missing `**Status:**` line".to_string(),
            }
        })?;
        self.fs.write(&path, &updated)?;

        tracing::info!(epic_slug = %slug, from = %current, to = %status, "status updated");
        Ok(())
    }

    /// Every readable PRD, sorted by number. Unreadable ones are skipped
    /// with a warning.
    pub fn list_epics(&self) -> Result<Vec<EpicSummary>> {
        let mut epics = Vec::new();

        for (_, _, name) in self.prd_entries()? {
            let path = self.config.prd_dir.join(&name);
            let parsed = self
                .fs
                .read_to_string(&path)
                .and_then(|content| PrdDocument::parse(&path, &content));
            match parsed {
                Ok(prd) => epics.push(prd.summary()),
                Err(e) => tracing::warn!(file = %name, error = %e, "skipping unreadable PRD"),
            }
        }

        Ok(epics)
    }
}
