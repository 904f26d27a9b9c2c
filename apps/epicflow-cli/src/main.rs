//! epicflow CLI
//!
//! Command-line front end for the epic lifecycle: PRDs, checks, changelogs,
//! learnings and pull requests. All rules live in `epicflow-core`; this
//! binary parses arguments, gathers interview answers and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use epicflow_core::tools::git::GitAdapter;
use epicflow_core::tools::git_impl::StdGitAdapter;
use epicflow_core::workflows::{ChangelogRequest, CompleteRequest};
use epicflow_core::{EpicError, EpicRuntime, EpicflowConfig, InterviewAnswers};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

mod prompt;

/// epicflow - epic lifecycle for feature work
///
/// Drafts PRDs, runs the project's checks, writes changelogs and learnings,
/// and opens the pull request.
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available epicflow commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize repository for epicflow use
    ///
    /// Creates .epicflow/ with a default configuration, the PRD and changelog
    /// directories, and the learnings log.
    Init,

    /// Create a new epic
    ///
    /// Interviews for the PRD sections (or reads them from --answers), writes
    /// a Draft PRD and switches to a new epic branch.
    CreateEpic {
        /// Human name of the epic (e.g., "Checkout Flow")
        name: String,

        /// TOML file with the interview answers
        #[arg(long)]
        answers: Option<PathBuf>,
    },

    /// Run tests, lint and typecheck, stopping at the first failure
    StartChecks,

    /// Write the changelog for an epic
    CreateChangelog(ChangelogArgs),

    /// Write the changelog and append learnings
    DocumentEpic {
        #[command(flatten)]
        changelog: ChangelogArgs,

        /// Learning to append to the shared log (repeatable)
        #[arg(long = "learning")]
        learnings: Vec<String>,
    },

    /// Complete an epic
    ///
    /// Runs preflight and checks, writes the changelog and learnings, marks
    /// the PRD Complete, then commits, pushes and opens the pull request.
    CompleteEpic {
        #[command(flatten)]
        changelog: ChangelogArgs,

        /// Learning to append to the shared log (repeatable)
        #[arg(long = "learning")]
        learnings: Vec<String>,

        /// Open the pull request as a draft
        #[arg(long)]
        draft: bool,
    },

    /// Push the epic branch and open its pull request
    CreatePr {
        /// Epic slug (defaults to the epic of the current branch)
        #[arg(long)]
        epic: Option<String>,

        /// Open the pull request as a draft
        #[arg(long)]
        draft: bool,
    },

    /// List all epics
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one epic
    Status {
        /// Epic slug
        slug: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ChangelogArgs {
    /// Epic slug
    slug: String,

    /// Pull request URL (looked up for the current branch when omitted)
    #[arg(long = "pr")]
    pr_link: Option<String>,

    /// Summary paragraph (defaults to the PRD objective)
    #[arg(long)]
    summary: Option<String>,

    /// Key change (repeatable; defaults to commit subjects on the branch)
    #[arg(long = "change")]
    changes: Vec<String>,

    /// Overwrite an existing changelog
    #[arg(long)]
    force: bool,
}

impl From<ChangelogArgs> for ChangelogRequest {
    fn from(args: ChangelogArgs) -> Self {
        ChangelogRequest {
            slug: args.slug,
            pr_link: args.pr_link,
            summary: args.summary,
            key_changes: args.changes,
            force: args.force,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = run_command(cli.command) {
        error!("command failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber for structured logging on stderr
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if verbose {
        EnvFilter::new("epicflow=debug,epicflow_core=debug,epicflow_templates=debug")
    } else {
        EnvFilter::new("epicflow=info,epicflow_core=info,epicflow_templates=info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}

/// Execute the specified command
fn run_command(command: Commands) -> Result<()> {
    let repo_root = find_repo_root()?;

    match command {
        Commands::Init => run_init(repo_root),
        command => {
            let runtime = load_runtime(&repo_root)?;
            run_epic_command(&runtime, command)
        }
    }
}

/// Execute a command that needs an initialized repository
fn run_epic_command(runtime: &EpicRuntime, command: Commands) -> Result<()> {
    match command {
        Commands::Init => run_init(runtime.config.repo_root.clone()),
        Commands::CreateEpic { name, answers } => {
            run_create_epic(runtime, &name, answers.as_deref())
        }
        Commands::StartChecks => run_start_checks(runtime),
        Commands::CreateChangelog(args) => {
            let path = runtime.create_changelog(&args.into())?;
            println!("✔ Wrote {}", runtime.config.relative(&path).display());
            Ok(())
        }
        Commands::DocumentEpic {
            changelog,
            learnings,
        } => {
            let documented = runtime.document_epic(&changelog.into(), &learnings)?;
            println!(
                "✔ Wrote {}",
                runtime.config.relative(&documented.changelog_path).display()
            );
            println!("✔ Appended {} learning(s)", documented.learnings_appended);
            Ok(())
        }
        Commands::CompleteEpic {
            changelog,
            learnings,
            draft,
        } => run_complete_epic(runtime, changelog, learnings, draft),
        Commands::CreatePr { epic, draft } => {
            let url = runtime.create_pr(epic.as_deref(), draft)?;
            println!("✔ Pull request: {}", url);
            Ok(())
        }
        Commands::List { json } => run_list(runtime, json),
        Commands::Status { slug, json } => run_status(runtime, &slug, json),
    }
}

/// Run the init command
fn run_init(repo_root: PathBuf) -> Result<()> {
    info!("initializing {}", repo_root.display());

    let runtime = EpicRuntime::new(EpicflowConfig::new(repo_root))
        .context("failed to create runtime")?;
    let created = runtime
        .init_project()
        .context("failed to initialize repository")?;

    for path in &created {
        println!("✔ Created {}", runtime.config.relative(path).display());
    }
    println!("\nRepository initialized for epicflow!");
    println!("\nNext steps:");
    println!("  epicflow create-epic <name>    Draft a PRD on a new branch");
    println!("  epicflow list                  Show all epics");

    Ok(())
}

fn run_create_epic(runtime: &EpicRuntime, name: &str, answers: Option<&Path>) -> Result<()> {
    // Reject a bad or taken name before asking any questions.
    let slug = runtime.new_epic_slug(name)?;

    let answers = match answers {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read answers file {}", path.display()))?;
            InterviewAnswers::from_toml(&source, path)?
        }
        None => prompt::run_interview(&mut std::io::stdin().lock())?,
    };

    let created = runtime.create_epic(name, answers)?;
    println!(
        "✔ Created epic {:03} ({}) at {}",
        created.number,
        slug,
        runtime.config.relative(&created.prd_path).display()
    );
    println!("✔ Switched to branch {}", created.branch);

    Ok(())
}

fn run_start_checks(runtime: &EpicRuntime) -> Result<()> {
    for report in runtime.start_checks()? {
        println!("✔ {} passed", report.step);
    }
    Ok(())
}

fn run_complete_epic(
    runtime: &EpicRuntime,
    changelog: ChangelogArgs,
    learnings: Vec<String>,
    draft: bool,
) -> Result<()> {
    let request = CompleteRequest {
        changelog: changelog.into(),
        learnings,
        draft,
    };
    let completed = runtime.complete_epic(&request)?;

    println!("✔ Checks passed");
    println!(
        "✔ Wrote {}",
        runtime.config.relative(&completed.changelog_path).display()
    );
    println!("✔ Appended {} learning(s)", completed.learnings_appended);
    println!("✔ Epic {:03} ({}) is Complete", completed.number, completed.slug);
    println!("✔ Pull request: {}", completed.pr_url);

    Ok(())
}

fn run_list(runtime: &EpicRuntime, json: bool) -> Result<()> {
    let epics = runtime.list_epics()?;
    if json {
        return print_json(&epics);
    }

    if epics.is_empty() {
        println!("No epics yet. Run 'epicflow create-epic <name>' to start one.");
        return Ok(());
    }
    for epic in &epics {
        println!(
            "{:03}  {:<12} {:<30} {}",
            epic.number,
            epic.status.to_string(),
            epic.slug,
            epic.title
        );
    }
    Ok(())
}

fn run_status(runtime: &EpicRuntime, slug: &str, json: bool) -> Result<()> {
    let details = runtime.epic_status(slug)?;
    if json {
        return print_json(&details);
    }

    println!("Epic {:03}: {}", details.number, details.title);
    println!("  Status:    {}", details.status);
    println!("  Created:   {}", details.created);
    println!("  Branch:    {}", details.branch);
    println!("  PRD:       {}", details.prd_path.display());
    match &details.changelog_path {
        Some(path) => println!("  Changelog: {}", path.display()),
        None => println!("  Changelog: (none)"),
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Find the repository root by asking git
fn find_repo_root() -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("failed to get current directory")?;
    let root = StdGitAdapter::new()
        .get_repo_root(&current_dir)
        .context("failed to find repository root - are you in a git repository?")?;
    Ok(root)
}

/// Load configuration from .epicflow/config.toml and build the runtime
fn load_runtime(repo_root: &Path) -> Result<EpicRuntime> {
    let config = EpicflowConfig::load(repo_root.to_path_buf())
        .context("failed to load epicflow configuration")?;
    if !config.is_initialized() {
        return Err(EpicError::NotInitialized.into());
    }

    EpicRuntime::new(config).context("failed to create runtime")
}
