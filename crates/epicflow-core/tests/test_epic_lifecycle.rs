//! End-to-end lifecycle against a real git repository.
//!
//! Checks and PR commands are replaced with shell builtins so the tests
//! only depend on `git` and `sh`.

#![cfg(unix)]

mod common;

use common::{commit_all, git, init_with_remote};
use epicflow_core::preflight::PreflightFailure;
use epicflow_core::tools::runner::StepKind;
use epicflow_core::workflows::{ChangelogRequest, CompleteRequest};
use epicflow_core::{EpicError, EpicRuntime, EpicStatus, EpicflowConfig, InterviewAnswers};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PR_URL: &str = "https://example.test/acme/shop/pull/7";

fn write_config(repo: &Path, typecheck: &str) {
    let content = format!(
        r#"[checks]
tests = "true"
lint = "echo lint ok"
typecheck = "{typecheck}"

[pr]
view = "false"
ready = "true"
create = "echo {PR_URL} #"
"#
    );
    fs::write(repo.join(".epicflow/config.toml"), content).unwrap();
}

fn answers() -> InterviewAnswers {
    InterviewAnswers::from_toml(
        r#"
objective = "Let customers pay for their cart."
dependencies = ["Stripe account"]
user_stories = "- As a customer I can pay by card."
tasks = "- [ ] Payment form\n- [ ] Webhook"
"#,
        Path::new("answers.toml"),
    )
    .unwrap()
}

/// Initialized repository with one Draft epic committed on its branch.
fn setup(temp: &TempDir, typecheck: &str) -> (std::path::PathBuf, EpicRuntime) {
    let (repo, _remote) = init_with_remote(temp);

    EpicRuntime::new(EpicflowConfig::new(repo.clone()))
        .unwrap()
        .init_project()
        .unwrap();
    write_config(&repo, typecheck);
    commit_all(&repo, "Set up epicflow");

    let runtime = EpicRuntime::new(EpicflowConfig::load(repo.clone()).unwrap()).unwrap();
    runtime.create_epic("Checkout Flow", answers()).unwrap();
    commit_all(&repo, "Add checkout flow PRD");

    fs::write(repo.join("payment.php"), "<?php\n").unwrap();
    commit_all(&repo, "Add payment form");

    (repo, runtime)
}

fn complete_request() -> CompleteRequest {
    CompleteRequest {
        changelog: ChangelogRequest {
            slug: "checkout-flow".to_string(),
            pr_link: Some(PR_URL.to_string()),
            ..Default::default()
        },
        learnings: vec!["Cashier needs a webhook secret".to_string()],
        draft: false,
    }
}

#[test]
fn test_complete_epic_end_to_end() {
    let temp = TempDir::new().unwrap();
    let (repo, runtime) = setup(&temp, "");

    let completed = runtime.complete_epic(&complete_request()).unwrap();
    assert_eq!(completed.number, 1);
    assert_eq!(completed.pr_url, PR_URL);
    assert_eq!(completed.learnings_appended, 1);

    let changelog = fs::read_to_string(repo.join("docs/changelog/001-checkout-flow.md")).unwrap();
    assert!(changelog.contains(PR_URL));
    assert!(changelog.contains("Let customers pay for their cart."));
    let first = changelog.find("- Add checkout flow PRD").unwrap();
    let second = changelog.find("- Add payment form").unwrap();
    assert!(first < second);

    let prd = fs::read_to_string(repo.join("docs/prd/001-checkout-flow.md")).unwrap();
    assert!(prd.contains("**Status:** Complete"));

    let learnings = fs::read_to_string(repo.join("docs/learnings.md")).unwrap();
    assert!(learnings.ends_with("- Cashier needs a webhook secret\n"));

    // Everything the completion wrote is committed and pushed.
    assert!(git(&repo, &["status", "--porcelain"]).trim().is_empty());
    let subject = git(&repo, &["log", "-1", "--format=%s"]);
    assert_eq!(subject.trim(), "Complete epic 1: Checkout Flow");
    let remote_head = git(&repo, &["rev-parse", "origin/feature/checkout-flow"]);
    let local_head = git(&repo, &["rev-parse", "HEAD"]);
    assert_eq!(remote_head, local_head);

    assert_eq!(
        runtime.epic_status("checkout-flow").unwrap().status,
        EpicStatus::Complete
    );
}

#[test]
fn test_failing_check_leaves_repository_untouched() {
    let temp = TempDir::new().unwrap();
    let (repo, runtime) = setup(&temp, "echo 'TS2322: bad type' >&2; exit 2");
    let head = git(&repo, &["rev-parse", "HEAD"]);

    let err = runtime.complete_epic(&complete_request()).unwrap_err();
    match err {
        EpicError::ExternalStepFailed { step, output } => {
            assert_eq!(step, StepKind::Typecheck);
            assert!(output.contains("TS2322"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(!repo.join("docs/changelog/001-checkout-flow.md").exists());
    assert!(git(&repo, &["status", "--porcelain"]).trim().is_empty());
    assert_eq!(git(&repo, &["rev-parse", "HEAD"]), head);
    assert_eq!(
        runtime.epic_status("checkout-flow").unwrap().status,
        EpicStatus::Draft
    );
}

#[test]
fn test_uncommitted_work_fails_preflight() {
    let temp = TempDir::new().unwrap();
    let (repo, runtime) = setup(&temp, "");
    fs::write(repo.join("payment.php"), "<?php // wip\n").unwrap();

    let err = runtime.complete_epic(&complete_request()).unwrap_err();
    match err {
        EpicError::PreflightFailed {
            reason: PreflightFailure::DirtyWorkingTree { changes },
        } => assert!(changes.iter().any(|c| c.contains("payment.php"))),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!repo.join("docs/changelog/001-checkout-flow.md").exists());
}

#[test]
fn test_completing_twice_is_rejected() {
    let temp = TempDir::new().unwrap();
    let (_repo, runtime) = setup(&temp, "");

    runtime.complete_epic(&complete_request()).unwrap();
    let err = runtime.complete_epic(&complete_request()).unwrap_err();
    assert!(matches!(err, EpicError::InvalidStatusTransition(_, _)));
}

#[test]
fn test_create_epic_refuses_dirty_tree() {
    let temp = TempDir::new().unwrap();
    let (repo, runtime) = setup(&temp, "");
    git(&repo, &["checkout", "--quiet", "main"]);
    fs::write(repo.join("notes.txt"), "scratch").unwrap();

    let err = runtime.create_epic("Search", answers()).unwrap_err();
    assert!(matches!(
        err,
        EpicError::PreflightFailed {
            reason: PreflightFailure::DirtyWorkingTree { .. }
        }
    ));
    assert!(git(&repo, &["branch", "--list", "feature/search"]).trim().is_empty());
}
