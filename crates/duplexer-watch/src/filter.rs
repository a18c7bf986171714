//! File name filtering for the watched directory.

use duplexer_config::MARKER_SUFFIX;
use duplexer_pipeline::fs_ops::is_marker;
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Matches input file names against the configured glob. Marker files never
/// match, whatever the pattern.
#[derive(Debug, Clone)]
pub struct FileFilter {
    pattern: String,
    matcher: GlobMatcher,
}

impl FileFilter {
    /// Compile `pattern` (e.g. `*.pdf`).
    pub fn new(pattern: &str) -> Result<Self> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        Ok(Self {
            pattern: pattern.to_string(),
            matcher,
        })
    }

    /// Source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether `path` names an input file this watcher handles.
    pub fn matches(&self, path: &Path) -> bool {
        if is_marker(path) {
            return false;
        }
        path.file_name()
            .map(|name| self.matcher.is_match(name))
            .unwrap_or(false)
    }

    /// Input file that the marker at `path` belongs to, if it would match.
    pub fn companion_of(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(MARKER_SUFFIX)?;
        if stem.is_empty() {
            return None;
        }
        let companion = path.with_file_name(stem);
        self.matches(&companion).then_some(companion)
    }
}
