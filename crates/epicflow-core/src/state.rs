//! Epic lifecycle status.
//!
//! The status recorded in a PRD is parsed into [`EpicStatus`] and every
//! change goes through [`EpicStatus::validate_transition`]; the free-text
//! field in the document is never trusted on its own.

use crate::error::{EpicError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an epic.
///
/// Statuses are sequential and non-reversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpicStatus {
    /// PRD written, implementation not started.
    Draft,

    /// Implementation under way on the epic branch.
    InProgress,

    /// Checks passed, changelog written, PR opened.
    Complete,
}

impl EpicStatus {
    /// Returns the text written to the PRD `**Status:**` line.
    pub fn as_str(&self) -> &'static str {
        match self {
            EpicStatus::Draft => "Draft",
            EpicStatus::InProgress => "In Progress",
            EpicStatus::Complete => "Complete",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// `Draft -> Complete` is allowed: the `InProgress` step is implicit and
    /// never recorded by the engine itself.
    pub fn can_transition_to(&self, next: EpicStatus) -> bool {
        matches!(
            (self, next),
            (EpicStatus::Draft, EpicStatus::InProgress)
                | (EpicStatus::Draft, EpicStatus::Complete)
                | (EpicStatus::InProgress, EpicStatus::Complete)
        )
    }

    /// Checks a transition, returning `EpicError::InvalidStatusTransition`
    /// when it would move backward, stay put, or leave `Complete`.
    pub fn validate_transition(&self, next: EpicStatus) -> Result<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(EpicError::InvalidStatusTransition(
                self.to_string(),
                next.to_string(),
            ))
        }
    }
}

impl fmt::Display for EpicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EpicStatus {
    type Err = String;

    /// Accepts the document spelling and the usual hand-typed variants.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "draft" => Ok(EpicStatus::Draft),
            "inprogress" => Ok(EpicStatus::InProgress),
            "complete" | "completed" => Ok(EpicStatus::Complete),
            _ => Err(format!("invalid status: {}", s.trim())),
        }
    }
}

/// One-line view of an epic, as listed from the PRD directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpicSummary {
    /// Epic number.
    pub number: u32,

    /// Epic slug.
    pub slug: String,

    /// Human title from the PRD heading.
    pub title: String,

    /// Status recorded in the PRD.
    pub status: EpicStatus,
}
