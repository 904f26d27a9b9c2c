//! Runtime for epicflow workflows.
//!
//! [`EpicRuntime`] owns the configuration, the template manager and the
//! tool registry, and hands them to the workflow functions. Every external
//! step goes through an [`ExternalRunner`] built over the same tools.

use crate::config::EpicflowConfig;
use crate::error::Result;
use crate::interview::InterviewAnswers;
use crate::state::EpicSummary;
use crate::store::DocumentStore;
use crate::tools::ToolRegistry;
use crate::tools::runner::StepReport;
use crate::tools::runner_impl::ExternalRunner;
use crate::workflows::{
    self, ChangelogRequest, CompleteRequest, CompletedEpic, CreatedEpic, DocumentedEpic,
    EpicDetails,
};
use epicflow_templates::TemplateManager;
use std::path::PathBuf;

/// Runtime for epicflow workflows.
///
/// # Examples
///
/// ```no_run
/// use epicflow_core::{EpicRuntime, EpicflowConfig};
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = EpicflowConfig::load(PathBuf::from("/path/to/repo"))?;
/// let runtime = EpicRuntime::new(config)?;
///
/// for epic in runtime.list_epics()? {
///     println!("{:03} {} [{}]", epic.number, epic.title, epic.status);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EpicRuntime {
    /// epicflow configuration.
    pub config: EpicflowConfig,

    /// Document templates, with the repository's overrides if present.
    pub templates: TemplateManager,

    /// Tool registry for file system, git, and shell operations.
    pub tools: ToolRegistry,
}

impl EpicRuntime {
    /// Creates a runtime over the real file system, `git` and `sh`.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::Template` if the configured template directory
    /// exists but cannot be used.
    pub fn new(config: EpicflowConfig) -> Result<Self> {
        Self::with_tools(config, ToolRegistry::standard())
    }

    /// Creates a runtime over the given tools.
    pub fn with_tools(config: EpicflowConfig, tools: ToolRegistry) -> Result<Self> {
        let templates =
            TemplateManager::with_optional_overrides(Some(config.template_dir.clone()))?;
        if templates.override_dir.is_some() {
            tracing::debug!(dir = %config.template_dir.display(), "using template overrides");
        }

        Ok(Self {
            config,
            templates,
            tools,
        })
    }

    /// Step runner over this runtime's shell and git adapters.
    pub fn runner(&self) -> ExternalRunner<'_> {
        ExternalRunner::new(&self.config, &self.tools)
    }

    /// Document store over this runtime's file system adapter.
    pub fn store(&self) -> DocumentStore<'_> {
        DocumentStore::new(&self.config, &*self.tools.fs, &self.templates)
    }

    /// See [`workflows::init_project`].
    pub fn init_project(&self) -> Result<Vec<PathBuf>> {
        workflows::init_project(&self.config, &*self.tools.fs, &*self.tools.git)
    }

    /// Checks that `name` can start a new epic and returns its slug.
    pub fn new_epic_slug(&self, name: &str) -> Result<String> {
        workflows::new_epic_slug(&self.store(), name)
    }

    /// See [`workflows::create_epic`].
    pub fn create_epic(&self, name: &str, answers: InterviewAnswers) -> Result<CreatedEpic> {
        workflows::create_epic(
            &self.config,
            &self.templates,
            &*self.tools.fs,
            &*self.tools.git,
            name,
            answers,
        )
    }

    /// See [`workflows::start_checks`].
    pub fn start_checks(&self) -> Result<Vec<StepReport>> {
        workflows::start_checks(&self.runner())
    }

    /// See [`workflows::create_changelog`].
    pub fn create_changelog(&self, request: &ChangelogRequest) -> Result<PathBuf> {
        workflows::create_changelog(
            &self.config,
            &self.templates,
            &*self.tools.fs,
            &*self.tools.git,
            &self.runner(),
            request,
        )
    }

    /// See [`workflows::document_epic`].
    pub fn document_epic(
        &self,
        request: &ChangelogRequest,
        learnings: &[String],
    ) -> Result<DocumentedEpic> {
        workflows::document_epic(
            &self.config,
            &self.templates,
            &*self.tools.fs,
            &*self.tools.git,
            &self.runner(),
            request,
            learnings,
        )
    }

    /// See [`workflows::complete_epic`].
    pub fn complete_epic(&self, request: &CompleteRequest) -> Result<CompletedEpic> {
        workflows::complete_epic(
            &self.config,
            &self.templates,
            &*self.tools.fs,
            &*self.tools.git,
            &self.runner(),
            request,
        )
    }

    /// See [`workflows::create_pr`].
    pub fn create_pr(&self, slug: Option<&str>, draft: bool) -> Result<String> {
        workflows::create_pr(
            &self.config,
            &self.templates,
            &*self.tools.fs,
            &*self.tools.git,
            &self.runner(),
            slug,
            draft,
        )
    }

    /// See [`workflows::list_epics`].
    pub fn list_epics(&self) -> Result<Vec<EpicSummary>> {
        workflows::list_epics(&self.config, &self.templates, &*self.tools.fs)
    }

    /// See [`workflows::epic_status`].
    pub fn epic_status(&self, slug: &str) -> Result<EpicDetails> {
        workflows::epic_status(&self.config, &self.templates, &*self.tools.fs, slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EpicError;
    use crate::preflight::PreflightFailure;
    use crate::state::EpicStatus;
    use crate::tools::fs::FsAdapter;
    use crate::tools::fs_mock::MockFsAdapter;
    use crate::tools::git_mock::MockGitAdapter;
    use crate::tools::runner::StepKind;
    use crate::tools::shell::CommandOutput;
    use crate::tools::shell_mock::MockShellAdapter;
    use std::path::Path;

    fn mock_runtime() -> (EpicRuntime, MockFsAdapter, MockGitAdapter, MockShellAdapter) {
        let fs = MockFsAdapter::new();
        let git = MockGitAdapter::with_repo("/repo");
        let shell = MockShellAdapter::with_success();
        let tools = ToolRegistry::new(
            Box::new(fs.clone()),
            Box::new(git.clone()),
            Box::new(shell.clone()),
        );
        let runtime = EpicRuntime::with_tools(EpicflowConfig::new(PathBuf::from("/repo")), tools)
            .unwrap();
        (runtime, fs, git, shell)
    }

    fn answers() -> InterviewAnswers {
        InterviewAnswers {
            objective: Some("Let customers pay.".to_string()),
            user_stories: Some("- As a customer I can pay.".to_string()),
            tasks: Some("- [ ] Payment form".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_lifecycle_over_mock_tools() {
        let (runtime, _fs, git, shell) = mock_runtime();
        shell.set_output(
            "gh pr view --json url -q .url",
            CommandOutput::failed(1, "no pull requests found for branch"),
        );
        shell.set_output(
            "gh pr create",
            CommandOutput::ok("https://github.com/acme/shop/pull/42\n"),
        );

        runtime.init_project().unwrap();
        let created = runtime.create_epic("Checkout Flow", answers()).unwrap();
        assert_eq!(created.branch, "feature/checkout-flow");
        git.set_subjects(&["Add payment form"]);

        let request = CompleteRequest {
            changelog: ChangelogRequest {
                slug: created.slug.clone(),
                pr_link: Some("https://github.com/acme/shop/pull/42".to_string()),
                ..Default::default()
            },
            learnings: vec!["Cashier needs a webhook secret".to_string()],
            draft: false,
        };
        let completed = runtime.complete_epic(&request).unwrap();

        assert_eq!(completed.pr_url, "https://github.com/acme/shop/pull/42");
        assert_eq!(
            runtime.epic_status("checkout-flow").unwrap().status,
            EpicStatus::Complete
        );
        assert_eq!(git.commits(), vec!["Complete epic 1: Checkout Flow"]);
        assert_eq!(
            git.pushes(),
            vec![("origin".to_string(), "feature/checkout-flow".to_string())]
        );
        assert_eq!(shell.command_count("php artisan test"), 1);
        assert_eq!(shell.command_count("gh pr create"), 1);
    }

    #[test]
    fn test_complete_on_default_branch_fails_preflight() {
        let (runtime, fs, git, shell) = mock_runtime();
        runtime.create_epic("Checkout Flow", answers()).unwrap();
        git.set_branch("main");
        let writes = fs.write_count();

        let request = CompleteRequest {
            changelog: ChangelogRequest {
                slug: "checkout-flow".to_string(),
                pr_link: Some("https://github.com/acme/shop/pull/42".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = runtime.complete_epic(&request).unwrap_err();

        assert!(matches!(
            err,
            EpicError::PreflightFailed {
                reason: PreflightFailure::OnDefaultBranch { .. }
            }
        ));
        assert_eq!(fs.write_count(), writes);
        assert!(shell.get_history().is_empty());
    }

    #[test]
    fn test_start_checks_reports_failing_tool_output() {
        let (runtime, _fs, _git, shell) = mock_runtime();
        shell.set_output("npm run types", CommandOutput::failed(2, "TS2322: Type 'string'"));

        let err = runtime.start_checks().unwrap_err();
        assert!(matches!(
            err,
            EpicError::ExternalStepFailed { step: StepKind::Typecheck, ref output }
                if output.contains("TS2322")
        ));
    }

    #[test]
    fn test_list_after_create() {
        let (runtime, fs, _git, _shell) = mock_runtime();
        runtime.create_epic("Checkout Flow", answers()).unwrap();

        let epics = runtime.list_epics().unwrap();
        assert_eq!(epics.len(), 1);
        assert_eq!(epics[0].status, EpicStatus::Draft);
        assert!(fs.is_file(Path::new("/repo/docs/prd/001-checkout-flow.md")));
    }
}
