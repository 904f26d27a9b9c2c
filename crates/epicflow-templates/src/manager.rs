//! Template manager implementation using minijinja.

use crate::{
    builtin,
    engine::TemplateEngine,
    error::{Result, TemplateError},
};
use serde::Serialize;
use std::path::PathBuf;

/// Manager for loading and rendering document templates.
///
/// `TemplateManager` wraps a minijinja environment whose loader looks in an
/// optional override directory first and falls back to the templates
/// embedded in this crate. Block tags swallow their own line, so templates
/// can lay out conditional sections without leaving blank-line debris.
///
/// # Examples
///
/// ```no_run
/// use epicflow_templates::{TemplateEngine, TemplateManager, builtin};
/// use std::collections::HashMap;
/// use std::path::PathBuf;
///
/// let manager = TemplateManager::new(PathBuf::from("./templates"))?;
/// let ctx = HashMap::from([("title", "Search"), ("objective", "Find products.")]);
/// let body = manager.render(builtin::PR_BODY, &ctx)?;
/// # Ok::<(), epicflow_templates::TemplateError>(())
/// ```
#[derive(Debug)]
pub struct TemplateManager {
    /// Directory whose `<name>.j2` files take precedence over built-ins.
    pub override_dir: Option<PathBuf>,
    /// Minijinja environment for template rendering.
    env: minijinja::Environment<'static>,
}

impl TemplateManager {
    /// Creates a manager that renders only the embedded templates.
    pub fn builtin() -> Self {
        Self {
            override_dir: None,
            env: build_environment(None),
        }
    }

    /// Creates a manager that prefers templates from `templates_dir`.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::TemplateDirectoryNotFound` if the directory
    /// does not exist or is not a directory.
    pub fn new(templates_dir: PathBuf) -> Result<Self> {
        if !templates_dir.is_dir() {
            return Err(TemplateError::TemplateDirectoryNotFound(templates_dir));
        }

        Ok(Self {
            env: build_environment(Some(templates_dir.clone())),
            override_dir: Some(templates_dir),
        })
    }

    /// Creates a manager with overrides when a directory is configured and
    /// present, otherwise with built-ins only.
    pub fn with_optional_overrides(templates_dir: Option<PathBuf>) -> Result<Self> {
        match templates_dir {
            Some(dir) if dir.exists() => Self::new(dir),
            _ => Ok(Self::builtin()),
        }
    }
}

impl Default for TemplateManager {
    fn default() -> Self {
        Self::builtin()
    }
}

fn build_environment(override_dir: Option<PathBuf>) -> minijinja::Environment<'static> {
    let mut env = minijinja::Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);

    env.set_loader(move |name: &str| {
        if let Some(dir) = &override_dir {
            let path = dir.join(format!("{name}.j2"));
            if path.is_file() {
                return std::fs::read_to_string(&path).map(Some).map_err(|e| {
                    minijinja::Error::new(
                        minijinja::ErrorKind::InvalidOperation,
                        format!("failed to read {}: {e}", path.display()),
                    )
                });
            }
        }

        Ok(builtin::source(name).map(str::to_string))
    });

    env
}

impl TemplateEngine for TemplateManager {
    fn render<T: Serialize>(&self, template: &str, ctx: &T) -> Result<String> {
        let tmpl = self.env.get_template(template).map_err(|e| {
            if e.kind() == minijinja::ErrorKind::TemplateNotFound {
                TemplateError::TemplateNotFound(template.to_string())
            } else {
                TemplateError::TemplateRenderError(format!("{template}: {e}"))
            }
        })?;

        tmpl.render(ctx)
            .map_err(|e| TemplateError::TemplateRenderError(format!("{template}: {e}")))
    }
}
