//! Configuration types for the epicflow runtime.
//!
//! [`EpicflowConfig::new`] derives every path from the repository root and
//! fills in defaults; [`EpicflowConfig::load`] layers `.epicflow/config.toml`
//! on top. All sections and keys in the file are optional.

use crate::error::{EpicError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory holding epicflow's own files, relative to the repository root.
pub const CONFIG_DIR: &str = ".epicflow";

/// Main epicflow configuration.
#[derive(Debug, Clone)]
pub struct EpicflowConfig {
    /// Repository root directory (absolute path).
    pub repo_root: PathBuf,

    /// Path to the configuration file (`.epicflow/config.toml`).
    pub config_file: PathBuf,

    /// Directory holding PRD documents.
    pub prd_dir: PathBuf,

    /// Directory holding changelog documents.
    pub changelog_dir: PathBuf,

    /// Shared learnings log.
    pub learnings_file: PathBuf,

    /// Directory of `<name>.j2` template overrides.
    pub template_dir: PathBuf,

    /// Git-related configuration.
    pub git: GitConfig,

    /// Commands for the check steps.
    pub checks: ChecksConfig,

    /// Pull-request commands.
    pub pr: PrConfig,
}

impl EpicflowConfig {
    /// Creates a new configuration with defaults derived from `repo_root`.
    pub fn new(repo_root: PathBuf) -> Self {
        let docs_dir = repo_root.join("docs");
        Self {
            config_file: repo_root.join(CONFIG_DIR).join("config.toml"),
            prd_dir: docs_dir.join("prd"),
            changelog_dir: docs_dir.join("changelog"),
            learnings_file: docs_dir.join("learnings.md"),
            template_dir: repo_root.join(CONFIG_DIR).join("templates"),
            repo_root,
            git: GitConfig::default(),
            checks: ChecksConfig::default(),
            pr: PrConfig::default(),
        }
    }

    /// Loads configuration from `.epicflow/config.toml`, falling back to
    /// defaults for the file as a whole and for every missing key.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::ConfigParseError` if the file exists but is not
    /// valid TOML or has keys of the wrong type, and `EpicError::Io` if it
    /// cannot be read.
    pub fn load(repo_root: PathBuf) -> Result<Self> {
        let mut config = Self::new(repo_root);

        if !config.config_file.exists() {
            tracing::debug!(
                config_file = %config.config_file.display(),
                "no config file, using defaults"
            );
            return Ok(config);
        }

        let raw = std::fs::read_to_string(&config.config_file)?;
        let file: ConfigFile = toml::from_str(&raw).map_err(|e| {
            EpicError::ConfigParseError(format!("{}: {}", config.config_file.display(), e))
        })?;

        config.apply(file);
        Ok(config)
    }

    /// Whether `init` has been run for this repository.
    pub fn is_initialized(&self) -> bool {
        self.repo_root.join(CONFIG_DIR).is_dir()
    }

    /// Branch name for an epic according to `git.branch_naming`.
    pub fn branch_name(&self, epic_number: u32, epic_slug: &str) -> String {
        self.git
            .branch_naming
            .replace("{epic_slug}", epic_slug)
            .replace("{epic_number}", &format!("{epic_number:03}"))
    }

    fn apply(&mut self, file: ConfigFile) {
        let root = self.repo_root.clone();
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { root.join(p) };

        if let Some(docs) = file.docs {
            if let Some(p) = docs.prd_dir {
                self.prd_dir = resolve(p);
            }
            if let Some(p) = docs.changelog_dir {
                self.changelog_dir = resolve(p);
            }
            if let Some(p) = docs.learnings_file {
                self.learnings_file = resolve(p);
            }
            if let Some(p) = docs.template_dir {
                self.template_dir = resolve(p);
            }
        }

        if let Some(git) = file.git {
            if let Some(v) = git.default_branch {
                self.git.default_branch = v;
            }
            if let Some(v) = git.remote {
                self.git.remote = v;
            }
            if let Some(v) = git.branch_naming {
                self.git.branch_naming = v;
            }
            if let Some(v) = git.fetch_before_preflight {
                self.git.fetch_before_preflight = v;
            }
        }

        if let Some(checks) = file.checks {
            if let Some(v) = checks.tests {
                self.checks.tests = v;
            }
            if let Some(v) = checks.lint {
                self.checks.lint = v;
            }
            if let Some(v) = checks.typecheck {
                self.checks.typecheck = v;
            }
        }

        if let Some(pr) = file.pr {
            if let Some(v) = pr.create {
                self.pr.create = v;
            }
            if let Some(v) = pr.ready {
                self.pr.ready = v;
            }
            if let Some(v) = pr.view {
                self.pr.view = v;
            }
            if let Some(v) = pr.draft {
                self.pr.draft = v;
            }
        }
    }

    /// Renders the default configuration file written by `init`.
    pub fn default_file_contents() -> String {
        let git = GitConfig::default();
        let checks = ChecksConfig::default();
        let pr = PrConfig::default();
        format!(
            r#"# epicflow configuration. Every key is optional.

[docs]
prd_dir = "docs/prd"
changelog_dir = "docs/changelog"
learnings_file = "docs/learnings.md"
template_dir = ".epicflow/templates"

[git]
default_branch = "{}"
remote = "{}"
branch_naming = "{}"
fetch_before_preflight = {}

[checks]
tests = "{}"
lint = "{}"
typecheck = "{}"

[pr]
create = "{}"
ready = "{}"
view = "{}"
draft = {}
"#,
            git.default_branch,
            git.remote,
            git.branch_naming,
            git.fetch_before_preflight,
            checks.tests,
            checks.lint,
            checks.typecheck,
            pr.create,
            pr.ready,
            pr.view,
            pr.draft,
        )
    }

    /// Path of `path` relative to the repository root, for display and
    /// for links between documents.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.repo_root).unwrap_or(path)
    }
}

/// Git-related configuration.
#[derive(Debug, Clone)]
pub struct GitConfig {
    /// The integration branch epics must not be completed on.
    pub default_branch: String,

    /// Remote used for fetch, push and upstream comparisons.
    pub remote: String,

    /// Branch naming pattern with `{epic_slug}` and `{epic_number}` placeholders.
    pub branch_naming: String,

    /// Whether preflight fetches the remote before comparing.
    pub fetch_before_preflight: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".to_string(),
            remote: "origin".to_string(),
            branch_naming: "feature/{epic_slug}".to_string(),
            fetch_before_preflight: true,
        }
    }
}

/// Shell commands for the check steps, run from the repository root.
#[derive(Debug, Clone)]
pub struct ChecksConfig {
    /// Test runner command.
    pub tests: String,

    /// Linter command.
    pub lint: String,

    /// Type-checker command.
    pub typecheck: String,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            tests: "php artisan test".to_string(),
            lint: "vendor/bin/pint --test".to_string(),
            typecheck: "npm run types".to_string(),
        }
    }
}

/// Pull-request commands.
///
/// `create` receives `--base`, `--title` and `--body-file` arguments;
/// `ready` and `view` receive nothing extra.
#[derive(Debug, Clone)]
pub struct PrConfig {
    /// Command that opens a pull request.
    pub create: String,

    /// Command that marks the branch's existing pull request ready.
    pub ready: String,

    /// Command that prints the URL of the branch's pull request.
    pub view: String,

    /// Open new pull requests as drafts.
    pub draft: bool,
}

impl Default for PrConfig {
    fn default() -> Self {
        Self {
            create: "gh pr create".to_string(),
            ready: "gh pr ready".to_string(),
            view: "gh pr view --json url -q .url".to_string(),
            draft: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    docs: Option<DocsSection>,
    git: Option<GitSection>,
    checks: Option<ChecksSection>,
    pr: Option<PrSection>,
}

#[derive(Debug, Default, Deserialize)]
struct DocsSection {
    prd_dir: Option<PathBuf>,
    changelog_dir: Option<PathBuf>,
    learnings_file: Option<PathBuf>,
    template_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct GitSection {
    default_branch: Option<String>,
    remote: Option<String>,
    branch_naming: Option<String>,
    fetch_before_preflight: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ChecksSection {
    tests: Option<String>,
    lint: Option<String>,
    typecheck: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PrSection {
    create: Option<String>,
    ready: Option<String>,
    view: Option<String>,
    draft: Option<bool>,
}
