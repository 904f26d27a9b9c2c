//! Document templates for epicflow.
//!
//! This crate renders the markdown artifacts of the epic lifecycle (PRDs,
//! changelogs, pull-request bodies) with minijinja. Templates ship embedded
//! in the crate and can be overridden per repository by dropping
//! `<name>.j2` files into a template directory.
//!
//! # Examples
//!
//! ```no_run
//! use epicflow_templates::{TemplateEngine, TemplateManager, builtin};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Body<'a> { number: u32, title: &'a str, objective: &'a str }
//!
//! let manager = TemplateManager::builtin();
//! let body = manager.render(builtin::PR_BODY, &Body {
//!     number: 3,
//!     title: "Checkout",
//!     objective: "Let customers pay.",
//! })?;
//! # Ok::<(), epicflow_templates::TemplateError>(())
//! ```

pub mod builtin;
pub mod engine;
pub mod error;
pub mod manager;

pub use engine::TemplateEngine;
pub use error::{Result, TemplateError};
pub use manager::TemplateManager;
