//! File system adapter trait.
//!
//! Every document read and write goes through [`FsAdapter`], so workflows
//! can run against the real file system or an in-memory mock.

use crate::error::Result;
use std::path::Path;

/// File system adapter trait.
///
/// Covers exactly the operations the document store and `init` need.
pub trait FsAdapter: Send + Sync {
    /// Reads the contents of a file as a string.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::PathNotFound` if the file doesn't exist and
    /// `EpicError::FileReadError` if reading fails.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Writes a string to a file, replacing it and creating missing parents.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::FileWriteError` if writing fails or
    /// `EpicError::PermissionDenied` if lacking write permissions.
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Appends a string to a file, creating it and its parents if needed.
    ///
    /// Existing bytes are never rewritten. A missing trailing newline is
    /// completed before `content` is written, inside the same critical
    /// section. Implementations backed by a shared file system serialize
    /// concurrent appends.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::FileWriteError` if writing fails and
    /// `EpicError::LockTimeout` if another writer holds the file too long.
    fn append(&self, path: &Path, content: &str) -> Result<()>;

    /// Lists entry names (not full paths) in a directory.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::PathNotFound` if the directory doesn't exist and
    /// `EpicError::InvalidPath` if the path is not a directory.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>>;

    /// Checks if a path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Creates a directory and all missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns `EpicError::FileWriteError` if creation fails or
    /// `EpicError::PermissionDenied` if lacking write permissions.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Checks if a path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Checks if a path exists and is a file.
    fn is_file(&self, path: &Path) -> bool;
}
