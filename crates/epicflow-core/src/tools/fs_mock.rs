//! In-memory file system adapter for tests.
//!
//! Files live in a `HashMap`, directories in a set; every mutating call is
//! counted so tests can assert that a failed transition wrote nothing.

use crate::error::{EpicError, Result};
use crate::tools::fs::FsAdapter;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Mock file system adapter for testing.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect another.
///
/// # Examples
///
/// ```
/// use epicflow_core::tools::fs_mock::MockFsAdapter;
/// use epicflow_core::tools::fs::FsAdapter;
/// use std::path::Path;
///
/// let fs = MockFsAdapter::new();
/// fs.write(Path::new("/docs/prd/001-search.md"), "# Epic 1: Search").unwrap();
/// assert!(fs.is_dir(Path::new("/docs/prd")));
/// assert_eq!(fs.write_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFsAdapter {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    dirs: Arc<Mutex<BTreeSet<PathBuf>>>,
    writes: Arc<Mutex<usize>>,
}

impl MockFsAdapter {
    /// Creates an empty mock file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock pre-populated with files (and their parent directories).
    /// Seeding does not count as a write.
    pub fn with_files(files: HashMap<PathBuf, String>) -> Self {
        let adapter = Self::new();
        for (path, content) in files {
            adapter.add_ancestors(&path);
            adapter.files.lock().unwrap().insert(path, content);
        }
        adapter
    }

    /// Returns a copy of all files (path -> content).
    pub fn get_all_files(&self) -> HashMap<PathBuf, String> {
        self.files.lock().unwrap().clone()
    }

    /// Number of `write`, `append` and `create_dir_all` calls so far.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn record_write(&self) {
        *self.writes.lock().unwrap() += 1;
    }

    fn add_ancestors(&self, path: &Path) {
        let mut dirs = self.dirs.lock().unwrap();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl FsAdapter for MockFsAdapter {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| EpicError::PathNotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.record_write();
        self.add_ancestors(path);
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn append(&self, path: &Path, content: &str) -> Result<()> {
        self.record_write();
        self.add_ancestors(path);
        let mut files = self.files.lock().unwrap();
        let existing = files.entry(path.to_path_buf()).or_default();
        if !existing.is_empty() && !existing.ends_with('\n') {
            existing.push('\n');
        }
        existing.push_str(content);
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
        if self.files.lock().unwrap().contains_key(path) {
            return Err(EpicError::InvalidPath(path.to_path_buf()));
        }
        if !self.dirs.lock().unwrap().contains(path) {
            return Err(EpicError::PathNotFound(path.to_path_buf()));
        }

        let mut entries = BTreeSet::new();
        let files = self.files.lock().unwrap();
        let dirs = self.dirs.lock().unwrap();
        for child in files.keys().chain(dirs.iter()) {
            if child.parent() == Some(path)
                && let Some(name) = child.file_name()
            {
                entries.insert(name.to_string_lossy().to_string());
            }
        }

        Ok(entries.into_iter().collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.record_write();
        self.add_ancestors(path);
        self.dirs.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}
