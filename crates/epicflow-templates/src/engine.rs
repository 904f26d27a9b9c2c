//! Core template engine trait definition.

use crate::error::Result;
use serde::Serialize;

/// Trait for rendering document templates with a serializable context.
///
/// # Examples
///
/// ```no_run
/// use epicflow_templates::{TemplateEngine, TemplateManager};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Ctx { number: u32 }
///
/// let manager = TemplateManager::builtin();
/// let rendered = manager.render("prd.md", &Ctx { number: 1 })?;
/// # Ok::<(), epicflow_templates::TemplateError>(())
/// ```
pub trait TemplateEngine {
    /// Renders a template by logical name (without the `.j2` extension).
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not exist, contains syntax
    /// errors, or rendering fails for the given context.
    fn render<T: Serialize>(&self, template: &str, ctx: &T) -> Result<String>;
}
