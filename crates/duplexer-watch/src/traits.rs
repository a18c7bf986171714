//! Seams between the watcher and its collaborators.

use async_trait::async_trait;
use duplexer_pipeline::{Pipeline, PipelineResult};
use std::path::Path;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::events::SourceEvent;
use crate::WatchBackend;

/// Source of "file touched" notifications for one directory.
#[async_trait]
pub trait EventSource: Send {
    /// Backend implemented by this source.
    fn backend(&self) -> WatchBackend;

    /// Start emitting events for `dir` (non-recursive) on `sender`.
    async fn start(&mut self, dir: &Path, sender: mpsc::UnboundedSender<SourceEvent>)
        -> Result<()>;

    /// Stop emitting events and release OS resources.
    async fn stop(&mut self) -> Result<()>;
}

/// Work performed on a ready, newly admitted file.
///
/// Runs on the blocking pool and may take as long as it needs.
pub trait FileProcessor: Send + Sync {
    /// Process `path` to completion.
    fn process(&self, path: &Path) -> PipelineResult;
}

impl FileProcessor for Pipeline {
    fn process(&self, path: &Path) -> PipelineResult {
        Pipeline::process(self, path)
    }
}
