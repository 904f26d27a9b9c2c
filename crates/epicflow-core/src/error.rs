//! Error types for epicflow operations.
//!
//! Every failure an operator can see is a variant here. Lifecycle failures
//! carry enough context (the failing step, its captured output, the
//! preflight reason) to be reported verbatim without further lookups.

use crate::preflight::PreflightFailure;
use crate::tools::runner::StepKind;
use std::path::PathBuf;
use thiserror::Error;

/// Comprehensive error types for epicflow operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EpicError {
    // Lifecycle errors
    /// The referenced epic has no PRD document.
    #[error("no PRD found for epic: {0}")]
    MissingPrd(String),

    /// A repository precondition did not hold.
    #[error("preflight check failed: {reason}")]
    PreflightFailed {
        /// Which check failed.
        reason: PreflightFailure,
    },

    /// A delegated tool returned non-success.
    #[error("step `{step}` failed:\n{output}")]
    ExternalStepFailed {
        /// The failing step.
        step: StepKind,
        /// Captured stdout and stderr of the step.
        output: String,
    },

    /// A required interview answer, PR link or other input is absent.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// The target document already exists and overwriting was not requested.
    #[error("already exists: {0} (pass --force to overwrite)")]
    AlreadyExists(PathBuf),

    /// An epic with this slug already has a PRD.
    #[error("epic already exists: {0}")]
    EpicAlreadyExists(String),

    /// Invalid epic slug format.
    #[error("invalid epic slug: {0}")]
    InvalidEpicSlug(String),

    /// Status change that the lifecycle does not allow.
    #[error("invalid status transition from {0} to {1}")]
    InvalidStatusTransition(String, String),

    /// A document on disk does not follow the heading convention.
    #[error("invalid document {path}: {reason}")]
    InvalidDocument {
        /// Path of the offending document.
        path: PathBuf,
        /// What could not be parsed.
        reason: String,
    },

    // Repository errors
    /// Not a git repository at the specified path.
    #[error("not a git repository: {0}")]
    NotGitRepository(PathBuf),

    /// Repository already initialized.
    #[error("repo already initialized for epicflow")]
    AlreadyInitialized,

    /// Repository not initialized - user needs to run `epicflow init` first.
    #[error("repo not initialized for epicflow - run `epicflow init` first")]
    NotInitialized,

    /// Git branch already exists with the specified name.
    #[error("branch already exists: {0}")]
    BranchExists(String),

    /// Git command failed with the specified error.
    #[error("git command failed: {0}")]
    GitCommandFailed(String),

    // File system errors
    /// Permission denied for the specified operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Path not found in the file system.
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    /// Invalid path provided.
    #[error("invalid path: {0}")]
    InvalidPath(PathBuf),

    /// Error reading file.
    #[error("file read error: {0}")]
    FileReadError(String),

    /// Error writing file.
    #[error("file write error: {0}")]
    FileWriteError(String),

    /// Another process holds the lock guarding a shared file.
    #[error("timed out waiting for lock: {0}")]
    LockTimeout(PathBuf),

    // Config errors
    /// Error parsing configuration file.
    #[error("config parse error: {0}")]
    ConfigParseError(String),

    // Template errors
    /// Document template failed to load or render.
    #[error(transparent)]
    Template(#[from] epicflow_templates::TemplateError),

    // Tool errors
    /// Shell command could not be started.
    #[error("shell command failed: {0}")]
    ShellCommandFailed(String),

    // IO and system errors
    /// Standard IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context from anyhow.
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for epicflow operations.
pub type Result<T> = std::result::Result<T, EpicError>;
