//! The process-wide import search path.
//!
//! One ordered list for the whole process, the in-process analog of the
//! interpreter's module search path. Activation only ever appends: nothing
//! is removed or reordered for the process lifetime, and a path is never
//! added twice.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

static SEARCH_PATH: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

fn lock() -> MutexGuard<'static, Vec<PathBuf>> {
    SEARCH_PATH.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Append `path` unless it is already present. Returns whether it was added.
pub fn append(path: &Path) -> bool {
    let mut paths = lock();
    if paths.iter().any(|p| p.as_path() == path) {
        return false;
    }
    paths.push(path.to_path_buf());
    true
}

/// Whether `path` has been activated in this process.
pub fn contains(path: &Path) -> bool {
    lock().iter().any(|p| p.as_path() == path)
}

/// Snapshot of the search path, in first-append order.
pub fn paths() -> Vec<PathBuf> {
    lock().clone()
}

/// Drop everything (used in tests).
pub fn reset() {
    lock().clear();
}
