//! In-memory record of dispatched inputs.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Paths dispatched during this run. Grows monotonically and is not persisted;
/// after a restart the pipeline's own idempotency check takes over.
#[derive(Debug, Default)]
pub struct ProcessedSet {
    paths: Mutex<HashSet<PathBuf>>,
}

impl ProcessedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` was already admitted.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.lock().contains(path)
    }

    /// Admit `path`. Returns `false` if it was already admitted, in which case
    /// the caller must not dispatch it.
    pub fn admit(&self, path: &Path) -> bool {
        self.paths.lock().insert(path.to_path_buf())
    }

    /// Number of admitted paths.
    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    /// Whether nothing has been admitted.
    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }
}
