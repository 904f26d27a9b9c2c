//! Standard file system adapter implementation.
//!
//! Backs [`FsAdapter`] with `std::fs`. Appends are serialized across
//! processes with an advisory `<file>.lock` sidecar.

use crate::error::{EpicError, Result};
use crate::tools::fs::FsAdapter;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const LOCK_ATTEMPTS: u32 = 100;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Standard file system adapter using `std::fs`.
///
/// The default adapter in production. For testing, use
/// [`MockFsAdapter`](crate::tools::fs_mock::MockFsAdapter) instead.
#[derive(Debug, Default)]
pub struct StdFsAdapter;

impl StdFsAdapter {
    /// Creates a new standard file system adapter.
    pub fn new() -> Self {
        Self
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            self.create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// Advisory lock held for the duration of one append.
///
/// Created with create-new semantics so exactly one holder exists at a
/// time; removed on drop.
struct AppendLock {
    path: PathBuf,
}

impl AppendLock {
    fn acquire(target: &Path) -> Result<Self> {
        let mut lock_path = target.as_os_str().to_owned();
        lock_path.push(".lock");
        let path = PathBuf::from(lock_path);

        for attempt in 0..LOCK_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if attempt == 0 {
                        tracing::debug!(lock = %path.display(), "waiting for append lock");
                    }
                    std::thread::sleep(LOCK_RETRY_DELAY);
                }
                Err(e) => {
                    return Err(EpicError::FileWriteError(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Err(EpicError::LockTimeout(path))
    }
}

impl Drop for AppendLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release append lock");
        }
    }
}

fn write_error(path: &Path, e: std::io::Error) -> EpicError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        EpicError::PermissionDenied(path.display().to_string())
    } else {
        EpicError::FileWriteError(format!("{}: {}", path.display(), e))
    }
}

/// True when `file` is non-empty and its last byte is not a newline.
fn needs_newline(file: &mut std::fs::File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl FsAdapter for StdFsAdapter {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EpicError::PathNotFound(path.to_path_buf())
            } else {
                EpicError::FileReadError(format!("{}: {}", path.display(), e))
            }
        })
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.ensure_parent(path)?;
        std::fs::write(path, content).map_err(|e| write_error(path, e))
    }

    fn append(&self, path: &Path, content: &str) -> Result<()> {
        self.ensure_parent(path)?;
        let _lock = AppendLock::acquire(path)?;

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| write_error(path, e))?;

        let mut chunk = String::with_capacity(content.len() + 1);
        if needs_newline(&mut file).map_err(|e| write_error(path, e))? {
            chunk.push('\n');
        }
        chunk.push_str(content);

        file.write_all(chunk.as_bytes())
            .map_err(|e| write_error(path, e))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(EpicError::PathNotFound(path.to_path_buf()));
        }

        if !path.is_dir() {
            return Err(EpicError::InvalidPath(path.to_path_buf()));
        }

        std::fs::read_dir(path)
            .map_err(|e| EpicError::FileReadError(format!("{}: {}", path.display(), e)))?
            .map(|entry| {
                entry
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .map_err(|e| {
                        EpicError::FileReadError(format!("failed to read directory entry: {}", e))
                    })
            })
            .collect()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| write_error(path, e))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}
