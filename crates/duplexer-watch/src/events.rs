//! Events produced by an [`EventSource`](crate::traits::EventSource).

use std::path::PathBuf;

/// Notification from an event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// A file in the watched directory was created or modified.
    Touched(PathBuf),
    /// Time for a full directory scan (polling mode).
    ScanTick,
}
