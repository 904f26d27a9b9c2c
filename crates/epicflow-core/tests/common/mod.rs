//! Shared helpers for integration tests that drive a real git repository.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("PRE_COMMIT_ALLOW_NO_CONFIG", "1")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn init_test_repo(dir: &Path) {
    git(dir, &["init", "--quiet"]);
    git(dir, &["checkout", "--quiet", "-B", "main"]);
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);

    fs::write(dir.join("README.md"), "# Shop").unwrap();
    git(dir, &["add", "README.md"]);
    git(dir, &["commit", "--quiet", "-m", "Initial commit"]);
}

/// Repository under `temp/repo` whose `main` tracks a bare `temp/origin.git`.
pub fn init_with_remote(temp: &TempDir) -> (PathBuf, PathBuf) {
    let remote = temp.path().join("origin.git");
    let repo = temp.path().join("repo");
    fs::create_dir_all(&remote).unwrap();
    fs::create_dir_all(&repo).unwrap();

    git(&remote, &["init", "--quiet", "--bare"]);
    init_test_repo(&repo);
    git(&repo, &["remote", "add", "origin", remote.to_str().unwrap()]);
    git(&repo, &["push", "--quiet", "-u", "origin", "main"]);
    (repo, remote)
}

pub fn commit_all(dir: &Path, message: &str) {
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "--quiet", "-m", message]);
}
