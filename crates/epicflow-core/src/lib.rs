//! epicflow core - lifecycle engine for epics.
//!
//! An epic is one unit of feature work. It is described by a PRD under
//! `docs/prd/`, developed on its own branch, verified by the project's
//! checks, documented by a changelog and shipped as a pull request. This
//! crate owns the rules of that lifecycle; the `epicflow` binary is a thin
//! shell over it.
//!
//! # Architecture
//!
//! - [`error`]: error type and result alias
//! - [`config`]: `.epicflow/config.toml` with defaults
//! - [`state`]: epic status and its transitions
//! - [`document`]: PRD and changelog documents, file naming, slugs
//! - [`interview`]: questions and answers that seed a PRD
//! - [`store`]: reads and writes documents through the file system adapter
//! - [`preflight`]: working tree and branch checks before completion
//! - [`tools`]: file system, git, shell and step-runner adapters
//! - [`workflows`]: one function per command
//! - [`runtime`]: owns config, templates and tools for the binary
//!
//! # Example
//!
//! ```rust,no_run
//! use epicflow_core::{EpicRuntime, EpicflowConfig, InterviewAnswers};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EpicflowConfig::load(PathBuf::from("/path/to/repo"))?;
//! let runtime = EpicRuntime::new(config)?;
//!
//! let answers = InterviewAnswers::from_toml(
//!     "objective = \"Let customers pay\"\nuser_stories = \"- pay\"\ntasks = \"- [ ] form\"",
//!     std::path::Path::new("answers.toml"),
//! )?;
//! let created = runtime.create_epic("Checkout Flow", answers)?;
//! println!("{} on {}", created.prd_path.display(), created.branch);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod interview;
pub mod preflight;
pub mod runtime;
pub mod state;
pub mod store;
pub mod tools;
pub mod workflows;

pub use config::{CONFIG_DIR, ChecksConfig, EpicflowConfig, GitConfig, PrConfig};
pub use document::{ChangelogDocument, PrdDocument};
pub use error::{EpicError, Result};
pub use interview::InterviewAnswers;
pub use preflight::{BranchState, PreflightChecker, PreflightFailure};
pub use runtime::EpicRuntime;
pub use state::{EpicStatus, EpicSummary};
pub use store::DocumentStore;
pub use tools::ToolRegistry;
