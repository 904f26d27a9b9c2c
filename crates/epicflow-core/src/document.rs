//! PRD and changelog documents.
//!
//! Documents are rendered through the template engine and parsed back by
//! their fixed headings. Only the known `## ` section headings split a PRD,
//! so sections may contain their own `###` structure.

use crate::error::{EpicError, Result};
use crate::state::EpicStatus;
use chrono::NaiveDate;
use epicflow_templates::{TemplateEngine, builtin};
use serde::Serialize;
use std::path::Path;

const SLUG_MIN: usize = 3;
const SLUG_MAX: usize = 60;

const STATUS_PREFIX: &str = "**Status:**";
const SLUG_PREFIX: &str = "**Slug:**";
const CREATED_PREFIX: &str = "**Created:**";

const OBJECTIVE: &str = "Objective";
const DEPENDENCIES: &str = "Dependencies";
const DATA_MODEL: &str = "Data Model";
const USER_STORIES: &str = "User Stories";
const TASKS: &str = "Tasks";
const OPEN_QUESTIONS: &str = "Open Questions";

const SECTIONS: [&str; 6] = [
    OBJECTIVE,
    DEPENDENCIES,
    DATA_MODEL,
    USER_STORIES,
    TASKS,
    OPEN_QUESTIONS,
];

/// Derives an epic slug from a human epic name.
///
/// Non-alphanumeric runs collapse into single hyphens and the result is cut
/// to the maximum slug length on a hyphen boundary when possible.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    if slug.len() > SLUG_MAX {
        slug.truncate(SLUG_MAX);
        if let Some(cut) = slug.rfind('-').filter(|&i| i >= SLUG_MIN) {
            slug.truncate(cut);
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Validates slug format: 3-60 characters of lowercase ASCII letters,
/// digits and single hyphens, starting with a letter.
///
/// # Errors
///
/// Returns `EpicError::InvalidEpicSlug` describing the first violated rule.
pub fn validate_epic_slug(slug: &str) -> Result<()> {
    let invalid = |why: &str| Err(EpicError::InvalidEpicSlug(format!("{} ({})", slug, why)));

    if slug.len() < SLUG_MIN || slug.len() > SLUG_MAX {
        return invalid("length must be 3-60 characters");
    }
    if !slug.starts_with(|c: char| c.is_ascii_lowercase()) {
        return invalid("must start with a lowercase letter");
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return invalid("only lowercase letters, numbers, and hyphens allowed");
    }
    if slug.contains("--") || slug.ends_with('-') {
        return invalid("hyphens must separate words");
    }

    Ok(())
}

/// File name shared by an epic's PRD and changelog: `NNN-<slug>.md`.
pub fn document_file_name(number: u32, slug: &str) -> String {
    format!("{number:03}-{slug}.md")
}

/// Splits a `NNN-<slug>.md` file name into number and slug.
pub fn parse_file_name(file_name: &str) -> Option<(u32, &str)> {
    let stem = file_name.strip_suffix(".md")?;
    let (number, slug) = stem.split_once('-')?;
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) || slug.is_empty() {
        return None;
    }
    Some((number.parse().ok()?, slug))
}

/// A product requirements document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrdDocument {
    pub number: u32,
    pub slug: String,
    pub title: String,
    #[serde(serialize_with = "serialize_status")]
    pub status: EpicStatus,
    pub created: NaiveDate,
    pub objective: String,
    /// Empty renders as `- None`.
    pub dependencies: Vec<String>,
    pub data_model: Option<String>,
    pub user_stories: String,
    pub tasks: String,
    pub open_questions: Option<String>,
}

fn serialize_status<S: serde::Serializer>(
    status: &EpicStatus,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(status.as_str())
}

impl PrdDocument {
    /// Renders the document with the `prd.md` template.
    pub fn render(&self, templates: &impl TemplateEngine) -> Result<String> {
        Ok(templates.render(builtin::PRD, self)?)
    }

    /// Parses a rendered PRD.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::InvalidDocument` when the title line, a header
    /// field or a required section is missing or malformed.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let invalid = |reason: String| EpicError::InvalidDocument {
            path: path.to_path_buf(),
            reason,
        };

        let title_line = content
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| invalid("document is empty".to_string()))?;
        let (number, title) = parse_title(title_line)
            .ok_or_else(|| invalid(format!("expected `# Epic N: Title`, found `{}`", title_line)))?;

        let header = |prefix: &str| {
            content
                .lines()
                .find_map(|l| l.trim().strip_prefix(prefix).map(|v| v.trim().to_string()))
                .ok_or_else(|| invalid(format!("missing `{}` line", prefix)))
        };

        let status_text = header(STATUS_PREFIX)?;
        let status = status_text.parse::<EpicStatus>().map_err(&invalid)?;
        let slug = header(SLUG_PREFIX)?;
        let created_text = header(CREATED_PREFIX)?;
        let created = NaiveDate::parse_from_str(&created_text, "%Y-%m-%d")
            .map_err(|e| invalid(format!("bad created date `{}`: {}", created_text, e)))?;

        let sections = split_sections(content);
        let section = |name: &str| sections.iter().find(|(n, _)| *n == name).map(|(_, body)| body.clone());
        let required = |name: &str| {
            section(name)
                .filter(|body| !body.is_empty())
                .ok_or_else(|| invalid(format!("missing `## {}` section", name)))
        };

        let dependencies = section(DEPENDENCIES)
            .map(|body| parse_dependencies(&body))
            .unwrap_or_default();

        Ok(Self {
            number,
            slug,
            title,
            status,
            created,
            objective: required(OBJECTIVE)?,
            dependencies,
            data_model: section(DATA_MODEL).filter(|b| !b.is_empty()),
            user_stories: required(USER_STORIES)?,
            tasks: required(TASKS)?,
            open_questions: section(OPEN_QUESTIONS).filter(|b| !b.is_empty()),
        })
    }

    /// Summary view for listings.
    pub fn summary(&self) -> crate::state::EpicSummary {
        crate::state::EpicSummary {
            number: self.number,
            slug: self.slug.clone(),
            title: self.title.clone(),
            status: self.status,
        }
    }
}

/// Rewrites only the `**Status:**` line of a rendered PRD, leaving every
/// other byte untouched. Returns `None` when there is no status line.
pub fn replace_status_line(content: &str, status: EpicStatus) -> Option<String> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with(STATUS_PREFIX) {
            let indent = line.len() - trimmed.len();
            let body_end = line.trim_end_matches(['\r', '\n']).len();
            let mut out = String::with_capacity(content.len());
            out.push_str(&content[..offset + indent]);
            out.push_str(STATUS_PREFIX);
            out.push(' ');
            out.push_str(status.as_str());
            out.push_str(&content[offset + body_end..]);
            return Some(out);
        }
        offset += line.len();
    }
    None
}

fn parse_title(line: &str) -> Option<(u32, String)> {
    let rest = line.strip_prefix("# Epic ")?;
    let (number, title) = rest.split_once(':')?;
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    Some((number.trim().parse().ok()?, title.to_string()))
}

fn split_sections(content: &str) -> Vec<(&'static str, String)> {
    let mut sections: Vec<(&'static str, Vec<&str>)> = Vec::new();

    for line in content.lines() {
        let heading = line
            .strip_prefix("## ")
            .and_then(|h| SECTIONS.iter().copied().find(|s| *s == h.trim()));
        match heading {
            Some(name) => sections.push((name, Vec::new())),
            None => {
                if let Some((_, body)) = sections.last_mut() {
                    body.push(line);
                }
            }
        }
    }

    sections
        .into_iter()
        .map(|(name, body)| (name, body.join("\n").trim().to_string()))
        .collect()
}

fn parse_dependencies(body: &str) -> Vec<String> {
    let items: Vec<String> = body
        .lines()
        .filter_map(|l| l.trim().strip_prefix("- "))
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    if items.len() == 1 && items[0].eq_ignore_ascii_case("none") {
        Vec::new()
    } else {
        items
    }
}

/// A completed epic's changelog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogDocument {
    pub number: u32,
    pub slug: String,
    pub title: String,
    pub date: NaiveDate,
    pub pr_link: String,
    pub summary: String,
    pub key_changes: Vec<String>,
}

impl ChangelogDocument {
    /// Builds a changelog, rejecting a blank PR link, a blank summary or an
    /// empty list of key changes.
    pub fn new(
        prd: &PrdDocument,
        date: NaiveDate,
        pr_link: &str,
        summary: &str,
        key_changes: Vec<String>,
    ) -> Result<Self> {
        let pr_link = pr_link.trim();
        if pr_link.is_empty() {
            return Err(EpicError::MissingInput("pull request link".to_string()));
        }
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(EpicError::MissingInput("changelog summary".to_string()));
        }
        let key_changes: Vec<String> = key_changes
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if key_changes.is_empty() {
            return Err(EpicError::MissingInput("key changes".to_string()));
        }

        Ok(Self {
            number: prd.number,
            slug: prd.slug.clone(),
            title: prd.title.clone(),
            date,
            pr_link: pr_link.to_string(),
            summary: summary.to_string(),
            key_changes,
        })
    }

    /// Renders the document with the `changelog.md` template.
    pub fn render(&self, templates: &impl TemplateEngine) -> Result<String> {
        Ok(templates.render(builtin::CHANGELOG, self)?)
    }
}
