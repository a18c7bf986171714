//! Ready-check and dispatch, shared by the debouncer and directory scans.

use duplexer_pipeline::PipelineResult;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::filter::FileFilter;
use crate::oracle::StabilityOracle;
use crate::processed::ProcessedSet;
use crate::traits::FileProcessor;

/// What happened to a dispatch attempt.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Not ready yet. Nothing is rescheduled.
    NotReady,
    /// Already dispatched during this run.
    AlreadyDispatched,
    /// Processor ran to completion.
    Processed(PipelineResult),
    /// Processor panicked. The path stays admitted.
    Panicked,
}

/// Owns the per-watcher state that decides whether a path is handed to the
/// processor: the filter, the readiness oracle and the processed set.
pub struct Dispatcher {
    filter: FileFilter,
    oracle: StabilityOracle,
    processed: ProcessedSet,
    processor: Arc<dyn FileProcessor>,
}

impl Dispatcher {
    /// Create a dispatcher with an empty processed set.
    pub fn new(
        filter: FileFilter,
        oracle: StabilityOracle,
        processor: Arc<dyn FileProcessor>,
    ) -> Self {
        Self {
            filter,
            oracle,
            processed: ProcessedSet::new(),
            processor,
        }
    }

    /// File name filter.
    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }

    /// Readiness oracle.
    pub fn oracle(&self) -> &StabilityOracle {
        &self.oracle
    }

    /// Paths dispatched so far.
    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    /// Re-check readiness and, if ready and not yet admitted, run the
    /// processor synchronously.
    ///
    /// Admission happens before the processor starts, so concurrent callers
    /// for the same path run it at most once.
    pub fn dispatch(&self, path: &Path) -> DispatchOutcome {
        if self.processed.contains(path) {
            return DispatchOutcome::AlreadyDispatched;
        }
        if !self.oracle.is_ready(path) {
            debug!("{} not ready yet, skipping", path.display());
            return DispatchOutcome::NotReady;
        }
        if !self.processed.admit(path) {
            return DispatchOutcome::AlreadyDispatched;
        }

        match catch_unwind(AssertUnwindSafe(|| self.processor.process(path))) {
            Ok(result) => {
                info!(path = %path.display(), outcome = result.label(), "Dispatch finished");
                DispatchOutcome::Processed(result)
            }
            Err(_) => {
                error!("Failed to process {}: processor panicked", path.display());
                DispatchOutcome::Panicked
            }
        }
    }
}
