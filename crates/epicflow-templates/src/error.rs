//! Error types for the template crate.

use std::path::PathBuf;

/// Errors that can occur while loading or rendering document templates.
#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    /// Template was found neither in the override directory nor among the built-ins.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Error occurred while rendering a template.
    #[error("template render error: {0}")]
    TemplateRenderError(String),

    /// Override directory does not exist or is not a directory.
    #[error("template directory not found: {0}")]
    TemplateDirectoryNotFound(PathBuf),
}

/// Result type alias for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;
