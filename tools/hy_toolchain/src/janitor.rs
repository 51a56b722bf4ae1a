//! Artifact Janitor
//!
//! Deletes the files the compiler and the system toolchain leave behind.
//! Missing files count as already clean. Other I/O failures are logged and
//! skipped: cleanup is best-effort and never changes a suite's verdict.

use std::io;
use std::path::{Path, PathBuf};

/// Remove `path` if it exists.
///
/// Returns `Ok(true)` if a file was deleted, `Ok(false)` if there was
/// nothing to delete.
///
/// # Errors
///
/// Any I/O error other than `NotFound`.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Remove every path in `paths`, returning the ones actually deleted.
pub fn cleanup<I, P>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut removed = Vec::new();

    for path in paths {
        let path = path.as_ref();
        match remove_if_exists(path) {
            Ok(true) => {
                tracing::debug!(path = %path.display(), "removed artifact");
                removed.push(path.to_path_buf());
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove artifact");
            }
        }
    }

    removed
}

/// Runs [`cleanup`] over its paths when dropped, so every exit path of a
/// suite (normal completion, early abort, panic) leaves the directory clean.
#[derive(Debug)]
pub struct CleanupGuard {
    paths: Vec<PathBuf>,
}

impl CleanupGuard {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            paths: paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        cleanup(&self.paths);
    }
}

#[cfg(test)]
mod tests;
