//! Lifecycle workflows.
//!
//! - `init`: prepare a repository
//! - `create`: interview answers -> Draft PRD on a new branch
//! - `checks`: tests, lint, typecheck
//! - `changelog`: changelog and learnings
//! - `complete`: the full Complete transition
//! - `pr`: push and open the pull request
//! - `report`: list and status views

pub mod changelog;
pub mod checks;
pub mod complete;
pub mod create;
pub mod init;
pub mod pr;
pub mod report;

pub use changelog::{ChangelogRequest, DocumentedEpic, create_changelog, document_epic};
pub use checks::start_checks;
pub use complete::{CompleteRequest, CompletedEpic, complete_epic};
pub use create::{CreatedEpic, create_epic, new_epic_slug};
pub use init::init_project;
pub use pr::create_pr;
pub use report::{EpicDetails, epic_status, list_epics};
