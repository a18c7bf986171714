//! # Duplexer Directory Watching
//!
//! Decides *when* a file in the ingest directory is handed to the pipeline.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   EventSource   │───▶│    Debouncer     │───▶│   Dispatcher    │
//! │ (notify, poll)  │    │ (timer per path) │    │ (oracle, set)   │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//!                                                         │
//!                                                         ▼
//!                                                ┌─────────────────┐
//!                                                │  FileProcessor  │
//!                                                │   (Pipeline)    │
//!                                                └─────────────────┘
//! ```
//!
//! - Native mode forwards OS notifications through the debouncer.
//! - Polling mode rescans the directory on every tick.
//! - Either way, a file is dispatched at most once per [`Watcher`].
//!
//! All shared state lives inside the [`Watcher`], so several watchers can run
//! in one process. Shutdown is a single cancellation token; see
//! [`StopHandle`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

use std::fmt;

pub mod backends;
pub mod debounce;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod filter;
pub mod oracle;
pub mod processed;
pub mod traits;
mod watcher;

pub use backends::{NotifyBackend, PollingBackend};
pub use debounce::{Debouncer, TimerRegistry};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{Result, StabilityCheckError, WatchError};
pub use events::SourceEvent;
pub use filter::FileFilter;
pub use oracle::StabilityOracle;
pub use processed::ProcessedSet;
pub use traits::{EventSource, FileProcessor};
pub use watcher::{StopHandle, Watcher, WatcherOptions};

/// Supported event source backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchBackend {
    /// OS notifications via the notify crate.
    Notify,
    /// Periodic directory scans.
    Polling,
}

impl fmt::Display for WatchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchBackend::Notify => write!(f, "notify"),
            WatchBackend::Polling => write!(f, "polling"),
        }
    }
}
