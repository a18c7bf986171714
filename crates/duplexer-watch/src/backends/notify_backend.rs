//! Notify-based event source.

use async_trait::async_trait;
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{
    new_debouncer, DebounceEventResult, DebouncedEvent, Debouncer as NotifyDebouncer,
    RecommendedCache,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{Result, WatchError};
use crate::events::SourceEvent;
use crate::traits::EventSource;
use crate::WatchBackend;

/// Coalescing tick for raw OS events.
const RAW_EVENT_TICK: Duration = Duration::from_millis(100);

/// OS notifications through `notify`, with short raw-event coalescing.
pub struct NotifyBackend {
    debouncer: Option<NotifyDebouncer<RecommendedWatcher, RecommendedCache>>,
    tick: Duration,
}

impl NotifyBackend {
    /// Create an idle backend.
    pub fn new() -> Self {
        Self {
            debouncer: None,
            tick: RAW_EVENT_TICK,
        }
    }

    /// Paths in `event` that count as touched files.
    ///
    /// Creates and modifications qualify. Renames count only for the
    /// destination, and directories are skipped.
    fn touched_paths(event: &DebouncedEvent) -> Vec<PathBuf> {
        let paths = &event.event.paths;
        let candidates: Vec<&PathBuf> = match event.event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Vec::new(),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                paths.last().into_iter().collect()
            }
            EventKind::Create(_) | EventKind::Modify(_) => paths.iter().collect(),
            _ => Vec::new(),
        };

        candidates
            .into_iter()
            .filter(|path| !path.is_dir())
            .cloned()
            .collect()
    }
}

impl Default for NotifyBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSource for NotifyBackend {
    fn backend(&self) -> WatchBackend {
        WatchBackend::Notify
    }

    async fn start(&mut self, dir: &Path, sender: mpsc::UnboundedSender<SourceEvent>) -> Result<()> {
        if self.debouncer.is_some() {
            return Err(WatchError::AlreadyRunning);
        }

        let mut debouncer = new_debouncer(self.tick, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    for event in events {
                        for path in Self::touched_paths(&event) {
                            debug!("File touched: {}", path.display());
                            if sender.send(SourceEvent::Touched(path)).is_err() {
                                // Receiver gone: the watcher is shutting down.
                                return;
                            }
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        error!("Notify error: {:?}", error);
                    }
                }
            }
        })
        .map_err(|e| WatchError::Watch(format!("Failed to create notify watcher: {}", e)))?;

        debouncer
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Watch(format!("Failed to watch {}: {}", dir.display(), e)))?;

        self.debouncer = Some(debouncer);
        info!("Notify watcher started for {}", dir.display());
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(debouncer) = self.debouncer.take() {
            debouncer.stop();
            info!("Notify watcher stopped");
        }
        Ok(())
    }
}
