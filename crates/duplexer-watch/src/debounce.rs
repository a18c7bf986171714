//! Per-path debouncing of touch notifications.
//!
//! Every notification for a path replaces that path's pending timer, so a
//! burst of writes produces a single readiness check timed from the last
//! notification.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::dispatch::Dispatcher;

struct PendingTimer {
    generation: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct RegistryState {
    next_generation: u64,
    timers: HashMap<PathBuf, PendingTimer>,
}

/// At most one live timer per path.
#[derive(Default)]
pub struct TimerRegistry {
    state: Mutex<RegistryState>,
}

impl TimerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any timer for `path` and register a new one whose token is a
    /// child of `parent`. Returns the new generation and token.
    pub fn replace(&self, path: &Path, parent: &CancellationToken) -> (u64, CancellationToken) {
        let mut state = self.state.lock();
        state.next_generation += 1;
        let generation = state.next_generation;
        let cancel = parent.child_token();

        let previous = state.timers.insert(
            path.to_path_buf(),
            PendingTimer {
                generation,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.cancel.cancel();
            debug!("Rescheduled pending check for {}", path.display());
        }
        (generation, cancel)
    }

    /// Remove the timer for `path` if `generation` is still the registered
    /// one. Returns `false` when the timer was replaced or cancelled.
    pub fn complete(&self, path: &Path, generation: u64) -> bool {
        let mut state = self.state.lock();
        match state.timers.get(path) {
            Some(timer) if timer.generation == generation => {
                state.timers.remove(path);
                true
            }
            _ => false,
        }
    }

    /// Cancel and drop every pending timer. Returns how many there were.
    pub fn cancel_all(&self) -> usize {
        let mut state = self.state.lock();
        let count = state.timers.len();
        for (_, timer) in state.timers.drain() {
            timer.cancel.cancel();
        }
        count
    }

    /// Number of pending timers.
    pub fn pending(&self) -> usize {
        self.state.lock().timers.len()
    }

    /// Whether `path` has a pending timer.
    pub fn is_pending(&self, path: &Path) -> bool {
        self.state.lock().timers.contains_key(path)
    }
}

/// Turns touch notifications into delayed dispatches.
#[derive(Clone)]
pub struct Debouncer {
    registry: Arc<TimerRegistry>,
    dispatcher: Arc<Dispatcher>,
    delay: Duration,
    cancel: CancellationToken,
}

impl Debouncer {
    /// Create a debouncer. Timers are children of `cancel`.
    pub fn new(
        registry: Arc<TimerRegistry>,
        dispatcher: Arc<Dispatcher>,
        delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            delay,
            cancel,
        }
    }

    /// Delay between the last notification and the readiness check.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule (or reschedule) a readiness check for `path`.
    ///
    /// Returns `false` if the path was rejected by the filter or has already
    /// been dispatched. Must be called within a tokio runtime.
    pub fn notify(&self, path: &Path) -> bool {
        if !self.dispatcher.filter().matches(path) {
            return false;
        }
        if self.dispatcher.processed().contains(path) {
            return false;
        }
        if self.cancel.is_cancelled() {
            return false;
        }

        let (generation, token) = self.registry.replace(path, &self.cancel);
        debug!(
            "Marked {} as pending, will check in {:.1}s",
            path.display(),
            self.delay.as_secs_f64()
        );

        let registry = Arc::clone(&self.registry);
        let dispatcher = Arc::clone(&self.dispatcher);
        let delay = self.delay;
        let path = path.to_path_buf();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if !registry.complete(&path, generation) {
                        return;
                    }
                    let shown = path.display().to_string();
                    let outcome =
                        tokio::task::spawn_blocking(move || dispatcher.dispatch(&path)).await;
                    if let Err(e) = outcome {
                        error!("Dispatch task for {} failed: {}", shown, e);
                    }
                }
            }
        });
        true
    }
}
