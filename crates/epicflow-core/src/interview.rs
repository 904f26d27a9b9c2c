//! Interview answers and PRD construction.
//!
//! Answers arrive either from a TOML file (`--answers`) or from the CLI's
//! prompts, which walk [`QUESTIONS`] in order. Either way they end up in
//! [`InterviewAnswers`] and go through [`build_prd`].

use crate::document::PrdDocument;
use crate::error::{EpicError, Result};
use crate::state::EpicStatus;
use serde::Deserialize;
use std::path::Path;

/// Which answer a question fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKey {
    Objective,
    Dependencies,
    DataModel,
    UserStories,
    Tasks,
    OpenQuestions,
}

/// One interview question.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub key: AnswerKey,
    pub prompt: &'static str,
    pub required: bool,
}

/// The interview, in PRD section order.
pub const QUESTIONS: &[Question] = &[
    Question {
        key: AnswerKey::Objective,
        prompt: "Objective: what should this epic achieve, and for whom?",
        required: true,
    },
    Question {
        key: AnswerKey::Dependencies,
        prompt: "Dependencies: other epics, services or accounts this needs (one per line, blank for none)",
        required: false,
    },
    Question {
        key: AnswerKey::DataModel,
        prompt: "Data Model: schema changes (blank if none)",
        required: false,
    },
    Question {
        key: AnswerKey::UserStories,
        prompt: "User Stories: \"As a <role> I can <action>\" (one per line)",
        required: true,
    },
    Question {
        key: AnswerKey::Tasks,
        prompt: "Tasks: implementation steps (one per line)",
        required: true,
    },
    Question {
        key: AnswerKey::OpenQuestions,
        prompt: "Open Questions: anything undecided (blank if none)",
        required: false,
    },
];

/// Dependencies may be written as a TOML array or as free text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependencyAnswer {
    Items(Vec<String>),
    Text(String),
}

impl DependencyAnswer {
    fn into_items(self) -> Vec<String> {
        let items = match self {
            DependencyAnswer::Items(items) => items,
            DependencyAnswer::Text(text) => text.lines().map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|i| {
                let i = i.trim();
                i.strip_prefix("- ")
                    .or_else(|| i.strip_prefix("* "))
                    .unwrap_or(i)
                    .trim()
                    .to_string()
            })
            .filter(|i| !i.is_empty() && !i.eq_ignore_ascii_case("none"))
            .collect()
    }
}

/// Free-form answers keyed by PRD section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterviewAnswers {
    pub objective: Option<String>,
    pub dependencies: Option<DependencyAnswer>,
    pub data_model: Option<String>,
    pub user_stories: Option<String>,
    pub tasks: Option<String>,
    pub open_questions: Option<String>,
}

impl InterviewAnswers {
    /// Parses answers from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::ConfigParseError` for invalid TOML or unknown keys.
    pub fn from_toml(source: &str, origin: &Path) -> Result<Self> {
        toml::from_str(source)
            .map_err(|e| EpicError::ConfigParseError(format!("{}: {}", origin.display(), e)))
    }

    /// Records the answer to one question.
    pub fn set(&mut self, key: AnswerKey, text: String) {
        match key {
            AnswerKey::Objective => self.objective = Some(text),
            AnswerKey::Dependencies => self.dependencies = Some(DependencyAnswer::Text(text)),
            AnswerKey::DataModel => self.data_model = Some(text),
            AnswerKey::UserStories => self.user_stories = Some(text),
            AnswerKey::Tasks => self.tasks = Some(text),
            AnswerKey::OpenQuestions => self.open_questions = Some(text),
        }
    }
}

fn non_blank(answer: Option<String>) -> Option<String> {
    answer
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
}

fn required(answer: Option<String>, what: &str) -> Result<String> {
    non_blank(answer).ok_or_else(|| EpicError::MissingInput(format!("interview answer `{}`", what)))
}

/// Turns interview answers into a Draft PRD dated today.
///
/// # Errors
///
/// Returns `EpicError::MissingInput` when objective, user stories or tasks
/// is missing or blank.
pub fn build_prd(
    number: u32,
    slug: &str,
    title: &str,
    answers: InterviewAnswers,
) -> Result<PrdDocument> {
    Ok(PrdDocument {
        number,
        slug: slug.to_string(),
        title: title.trim().to_string(),
        status: EpicStatus::Draft,
        created: chrono::Local::now().date_naive(),
        objective: required(answers.objective, "objective")?,
        user_stories: required(answers.user_stories, "user_stories")?,
        tasks: required(answers.tasks, "tasks")?,
        dependencies: answers
            .dependencies
            .map(DependencyAnswer::into_items)
            .unwrap_or_default(),
        data_model: non_blank(answers.data_model),
        open_questions: non_blank(answers.open_questions),
    })
}
