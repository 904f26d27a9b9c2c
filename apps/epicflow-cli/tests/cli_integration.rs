//! Integration tests for the epicflow CLI.
//!
//! Each test drives the binary inside a temporary git repository. Check
//! and PR commands are configured as shell builtins.

#![cfg(unix)]

use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const PR_URL: &str = "https://example.test/acme/shop/pull/7";

const ANSWERS: &str = r#"
objective = "Let customers pay for their cart."
dependencies = ["Stripe account"]
user_stories = "- As a customer I can pay by card."
tasks = "- [ ] Payment form"
"#;

fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("PRE_COMMIT_ALLOW_NO_CONFIG", "1")
        .output()?;
    anyhow::ensure!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(String::from_utf8(output.stdout)?)
}

/// Helper to create a temporary git repository with a bare origin
fn create_test_repo() -> Result<(TempDir, std::path::PathBuf)> {
    let temp_dir = tempfile::tempdir()?;
    let remote = temp_dir.path().join("origin.git");
    let repo = temp_dir.path().join("repo");
    std::fs::create_dir_all(&remote)?;
    std::fs::create_dir_all(&repo)?;

    git(&remote, &["init", "--quiet", "--bare"])?;
    git(&repo, &["init", "--quiet"])?;
    git(&repo, &["checkout", "--quiet", "-B", "main"])?;
    git(&repo, &["config", "user.name", "Test User"])?;
    git(&repo, &["config", "user.email", "test@example.com"])?;
    git(&repo, &["config", "commit.gpgsign", "false"])?;

    std::fs::write(repo.join("README.md"), "# Shop")?;
    git(&repo, &["add", "."])?;
    git(&repo, &["commit", "--quiet", "-m", "Initial commit"])?;
    git(&repo, &["remote", "add", "origin", remote.to_str().unwrap()])?;
    git(&repo, &["push", "--quiet", "-u", "origin", "main"])?;

    Ok((temp_dir, repo))
}

fn epicflow(dir: &Path, args: &[&str]) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_epicflow"))
        .args(args)
        .current_dir(dir)
        .output()?)
}

fn epicflow_with_stdin(dir: &Path, args: &[&str], stdin: &str) -> Result<Output> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_epicflow"))
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())?;
    Ok(child.wait_with_output()?)
}

/// Initialized repository with test-friendly commands, committed on main
fn initialized_repo(typecheck: &str) -> Result<(TempDir, std::path::PathBuf)> {
    let (temp_dir, repo) = create_test_repo()?;
    let output = epicflow(&repo, &["init"])?;
    anyhow::ensure!(output.status.success(), "init failed: {:?}", output);

    std::fs::write(
        repo.join(".epicflow/config.toml"),
        format!(
            "[checks]\ntests = \"true\"\nlint = \"true\"\ntypecheck = \"{typecheck}\"\n\n\
             [pr]\nview = \"false\"\nready = \"true\"\ncreate = \"echo {PR_URL} #\"\n"
        ),
    )?;
    git(&repo, &["add", "-A"])?;
    git(&repo, &["commit", "--quiet", "-m", "Set up epicflow"])?;

    Ok((temp_dir, repo))
}

fn create_epic(repo: &Path) -> Result<()> {
    std::fs::write(repo.join("../answers.toml"), ANSWERS)?;
    let answers = repo.join("../answers.toml");
    let output = epicflow(
        repo,
        &["create-epic", "Checkout Flow", "--answers", answers.to_str().unwrap()],
    )?;
    anyhow::ensure!(output.status.success(), "create-epic failed: {:?}", output);
    Ok(())
}

#[test]
fn test_cli_version() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_epicflow"))
        .arg("--version")
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("epicflow"));

    Ok(())
}

#[test]
fn test_cli_help() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_epicflow"))
        .arg("--help")
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    for command in [
        "init",
        "create-epic",
        "start-checks",
        "create-changelog",
        "document-epic",
        "complete-epic",
        "create-pr",
        "list",
        "status",
    ] {
        assert!(stdout.contains(command), "help is missing {command}");
    }

    Ok(())
}

#[test]
fn test_init_outside_git_repo_fails() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;

    let output = epicflow(temp_dir.path(), &["init"])?;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("repository root"));

    Ok(())
}

#[test]
fn test_init_creates_layout_and_refuses_rerun() -> Result<()> {
    let (_temp_dir, repo) = create_test_repo()?;

    let output = epicflow(&repo, &["init"])?;
    assert!(output.status.success());
    assert!(repo.join(".epicflow/config.toml").is_file());
    assert!(repo.join("docs/prd").is_dir());
    assert!(repo.join("docs/changelog").is_dir());
    assert_eq!(
        std::fs::read_to_string(repo.join("docs/learnings.md"))?,
        "# Learnings\n\n"
    );

    let output = epicflow(&repo, &["init"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("already initialized"));

    Ok(())
}

#[test]
fn test_commands_require_init() -> Result<()> {
    let (_temp_dir, repo) = create_test_repo()?;

    let output = epicflow(&repo, &["list"])?;

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("epicflow init"));

    Ok(())
}

#[test]
fn test_create_epic_from_answers_file() -> Result<()> {
    let (_temp_dir, repo) = initialized_repo("")?;

    create_epic(&repo)?;

    let prd = std::fs::read_to_string(repo.join("docs/prd/001-checkout-flow.md"))?;
    assert!(prd.starts_with("# Epic 1: Checkout Flow\n"));
    assert!(prd.contains("**Status:** Draft"));
    assert!(prd.contains("- Stripe account"));
    assert_eq!(
        git(&repo, &["rev-parse", "--abbrev-ref", "HEAD"])?.trim(),
        "feature/checkout-flow"
    );

    // The name is taken now.
    git(&repo, &["add", "-A"])?;
    git(&repo, &["commit", "--quiet", "-m", "Add PRD"])?;
    let output = epicflow(&repo, &["create-epic", "Checkout Flow"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("epic already exists: checkout-flow"));

    Ok(())
}

#[test]
fn test_create_epic_interactive() -> Result<()> {
    let (_temp_dir, repo) = initialized_repo("")?;

    let output = epicflow_with_stdin(
        &repo,
        &["create-epic", "Search"],
        "Find products fast.\n\n\n\n- As a shopper I can search.\n\n- [ ] Index\n\n\n",
    )?;
    assert!(output.status.success(), "{:?}", output);

    let prd = std::fs::read_to_string(repo.join("docs/prd/001-search.md"))?;
    assert!(prd.contains("Find products fast."));
    assert!(prd.contains("- None"));
    assert!(!prd.contains("## Data Model"));

    Ok(())
}

#[test]
fn test_create_epic_missing_answer_writes_nothing() -> Result<()> {
    let (_temp_dir, repo) = initialized_repo("")?;

    let output = epicflow_with_stdin(&repo, &["create-epic", "Search"], "Find products fast.\n")?;

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("missing input"));
    assert!(!repo.join("docs/prd/001-search.md").exists());
    assert_eq!(git(&repo, &["rev-parse", "--abbrev-ref", "HEAD"])?.trim(), "main");

    Ok(())
}

#[test]
fn test_list_and_status_json() -> Result<()> {
    let (_temp_dir, repo) = initialized_repo("")?;
    create_epic(&repo)?;

    let output = epicflow(&repo, &["list", "--json"])?;
    assert!(output.status.success());
    let epics: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(epics[0]["number"], 1);
    assert_eq!(epics[0]["slug"], "checkout-flow");

    let output = epicflow(&repo, &["status", "checkout-flow", "--json"])?;
    assert!(output.status.success());
    let details: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(details["branch"], "feature/checkout-flow");
    assert!(details["changelog_path"].is_null());

    let output = epicflow(&repo, &["status", "missing"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("no PRD found for epic: missing"));

    Ok(())
}

#[test]
fn test_start_checks_reports_failing_step() -> Result<()> {
    let (_temp_dir, repo) = initialized_repo("echo TS2322 >&2; exit 2")?;

    let output = epicflow(&repo, &["start-checks"])?;

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stdout.is_empty());
    assert!(stderr.contains("step `typecheck` failed"));
    assert!(stderr.contains("TS2322"));

    Ok(())
}

#[test]
fn test_complete_epic() -> Result<()> {
    let (_temp_dir, repo) = initialized_repo("")?;
    create_epic(&repo)?;
    git(&repo, &["add", "-A"])?;
    git(&repo, &["commit", "--quiet", "-m", "Add checkout PRD"])?;

    let output = epicflow(
        &repo,
        &[
            "complete-epic",
            "checkout-flow",
            "--pr",
            PR_URL,
            "--learning",
            "Cashier needs a webhook secret",
        ],
    )?;
    assert!(output.status.success(), "{:?}", output);
    assert!(String::from_utf8(output.stdout)?.contains(PR_URL));

    let changelog = std::fs::read_to_string(repo.join("docs/changelog/001-checkout-flow.md"))?;
    assert!(changelog.contains("- Add checkout PRD"));

    let output = epicflow(&repo, &["status", "checkout-flow"])?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Complete"));
    assert!(stdout.contains("docs/changelog/001-checkout-flow.md"));

    // A second changelog needs --force.
    let output = epicflow(&repo, &["create-changelog", "checkout-flow", "--pr", PR_URL])?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("--force"));

    Ok(())
}

#[test]
fn test_complete_epic_on_default_branch_fails() -> Result<()> {
    let (_temp_dir, repo) = initialized_repo("")?;
    create_epic(&repo)?;
    git(&repo, &["add", "-A"])?;
    git(&repo, &["commit", "--quiet", "-m", "Add checkout PRD"])?;
    git(&repo, &["checkout", "--quiet", "main"])?;
    git(&repo, &["merge", "--quiet", "feature/checkout-flow"])?;

    let output = epicflow(&repo, &["complete-epic", "checkout-flow", "--pr", PR_URL])?;

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("preflight check failed"));
    assert!(!repo.join("docs/changelog/001-checkout-flow.md").exists());

    Ok(())
}
