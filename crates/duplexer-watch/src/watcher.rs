//! Composition root: event source, debouncer, dispatcher and lifecycle.

use duplexer_config::{DuplexerConfig, ReadinessPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backends::{NotifyBackend, PollingBackend};
use crate::debounce::{Debouncer, TimerRegistry};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::error::{Result, WatchError};
use crate::events::SourceEvent;
use crate::filter::FileFilter;
use crate::oracle::StabilityOracle;
use crate::processed::ProcessedSet;
use crate::traits::{EventSource, FileProcessor};

/// Settings for one [`Watcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherOptions {
    /// Directory to watch (non-recursive)
    pub input_dir: PathBuf,
    /// File name glob
    pub pattern: String,
    /// Readiness policy
    pub policy: ReadinessPolicy,
    /// Debounce delay in marker mode
    pub marker_check_delay: Duration,
    /// Scan interval in polling mode
    pub poll_interval: Duration,
    /// Skip native notifications
    pub force_polling: bool,
}

impl WatcherOptions {
    /// Derive watcher settings from the loaded configuration.
    pub fn from_config(config: &DuplexerConfig) -> Self {
        Self {
            input_dir: config.paths.input_dir.clone(),
            pattern: config.watch.pattern.clone(),
            policy: config.readiness_policy(),
            marker_check_delay: config.marker_check_delay(),
            poll_interval: config.poll_interval(),
            force_polling: config.watch.force_polling,
        }
    }

    /// Delay between the last notification for a file and its check.
    pub fn debounce_delay(&self) -> Duration {
        match self.policy {
            ReadinessPolicy::Stability { window } => window,
            ReadinessPolicy::Marker => self.marker_check_delay,
        }
    }
}

/// Cloneable handle that stops a [`Watcher`] from any task or thread.
#[derive(Clone)]
pub struct StopHandle {
    cancel: CancellationToken,
    registry: Arc<TimerRegistry>,
}

impl StopHandle {
    /// Stop watching and cancel all pending timers. In-flight processing runs
    /// to completion without being awaited.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            info!("Stopping watcher");
        }
        self.cancel.cancel();
        let dropped = self.registry.cancel_all();
        if dropped > 0 {
            debug!("Cancelled {} pending check(s)", dropped);
        }
    }

    /// Whether stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Watches one directory and hands ready files to a [`FileProcessor`].
///
/// ```text
/// EventSource ──▶ Debouncer ──▶ TimerRegistry ──timer──▶ Dispatcher ──▶ FileProcessor
///  (notify |        (filter,       (one per path)         (oracle,
///   polling)         processed)                            processed set)
/// ```
pub struct Watcher {
    options: WatcherOptions,
    dispatcher: Arc<Dispatcher>,
    registry: Arc<TimerRegistry>,
    debouncer: Debouncer,
    cancel: CancellationToken,
    running: AtomicBool,
    scanning: Arc<AtomicBool>,
}

impl Watcher {
    /// Build a watcher. Fails on an invalid pattern or a missing directory.
    pub fn new(options: WatcherOptions, processor: Arc<dyn FileProcessor>) -> Result<Self> {
        if !options.input_dir.is_dir() {
            return Err(WatchError::InvalidPath(format!(
                "input directory does not exist: {}",
                options.input_dir.display()
            )));
        }
        if options.poll_interval.is_zero() {
            return Err(WatchError::Config(
                "poll interval must be positive".to_string(),
            ));
        }

        let filter = FileFilter::new(&options.pattern)?;
        let oracle = StabilityOracle::new(options.policy);
        let dispatcher = Arc::new(Dispatcher::new(filter, oracle, processor));
        let registry = Arc::new(TimerRegistry::new());
        let cancel = CancellationToken::new();
        let debouncer = Debouncer::new(
            Arc::clone(&registry),
            Arc::clone(&dispatcher),
            options.debounce_delay(),
            cancel.clone(),
        );

        info!(
            "Watcher initialized: {} (pattern={}, polling={})",
            options.input_dir.display(),
            options.pattern,
            options.force_polling
        );

        Ok(Self {
            options,
            dispatcher,
            registry,
            debouncer,
            cancel,
            running: AtomicBool::new(false),
            scanning: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Watcher settings.
    pub fn options(&self) -> &WatcherOptions {
        &self.options
    }

    /// Paths dispatched so far.
    pub fn processed(&self) -> &ProcessedSet {
        self.dispatcher.processed()
    }

    /// Number of pending debounce timers.
    pub fn pending(&self) -> usize {
        self.registry.pending()
    }

    /// Handle for stopping the watcher from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Stop watching. See [`StopHandle::stop`].
    pub fn stop(&self) {
        self.stop_handle().stop();
    }

    /// Scan the directory once and dispatch every ready file synchronously.
    ///
    /// Returns the number of files handed to the processor. Blocks; call it
    /// from a blocking context when inside a runtime.
    pub fn scan_once(&self) -> Result<usize> {
        scan_dir(&self.options.input_dir, &self.dispatcher, &self.cancel)
    }

    /// Feed a touch notification for `path`, as an event source would.
    ///
    /// In marker mode a marker notification schedules its companion file.
    /// Must be called within a tokio runtime.
    pub fn notify(&self, path: &Path) -> bool {
        if let Some(companion) = self.dispatcher.filter().companion_of(path) {
            if self.options.policy == ReadinessPolicy::Marker {
                debug!("Marker appeared for {}", companion.display());
                return self.debouncer.notify(&companion);
            }
            return false;
        }
        self.debouncer.notify(path)
    }

    /// Run until [`stop`](Self::stop) is called.
    ///
    /// Performs one scan of existing files, then watches with native
    /// notifications (falling back to polling) or polling alone.
    pub async fn run(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(WatchError::AlreadyRunning);
        }
        let result = self.run_inner().await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_inner(&self) -> Result<()> {
        // The scan keeps running on the blocking pool if stop arrives first.
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("Stopped during initial scan");
                return Ok(());
            }
            initial = self.scan_blocking() => {
                let initial = initial?;
                if initial > 0 {
                    info!("Processed {} existing file(s)", initial);
                }
            }
        }
        if self.cancel.is_cancelled() {
            return Ok(());
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut source = self.start_source(tx).await?;
        info!(
            "Watching {} with {} backend",
            self.options.input_dir.display(),
            source.backend()
        );

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("Watch loop cancelled");
                    break;
                }
                event = rx.recv() => match event {
                    Some(SourceEvent::Touched(path)) => {
                        self.notify(&path);
                    }
                    Some(SourceEvent::ScanTick) => self.spawn_scan(),
                    None => {
                        warn!("Event source closed unexpectedly");
                        break;
                    }
                },
            }
        }

        if let Err(e) = source.stop().await {
            warn!("Failed to stop {} backend: {}", source.backend(), e);
        }
        self.registry.cancel_all();
        info!("Watcher stopped");
        Ok(())
    }

    async fn start_source(
        &self,
        sender: mpsc::UnboundedSender<SourceEvent>,
    ) -> Result<Box<dyn EventSource>> {
        let dir = &self.options.input_dir;
        if !self.options.force_polling {
            let mut native = NotifyBackend::new();
            match native.start(dir, sender.clone()).await {
                Ok(()) => return Ok(Box::new(native)),
                Err(e) => warn!("Native file watching unavailable ({}), falling back to polling", e),
            }
        }

        let mut polling = PollingBackend::new(self.options.poll_interval);
        polling.start(dir, sender).await?;
        Ok(Box::new(polling))
    }

    async fn scan_blocking(&self) -> Result<usize> {
        let dir = self.options.input_dir.clone();
        let dispatcher = Arc::clone(&self.dispatcher);
        let cancel = self.cancel.clone();
        tokio::task::spawn_blocking(move || scan_dir(&dir, &dispatcher, &cancel))
            .await
            .map_err(|e| WatchError::Internal(format!("scan task failed: {}", e)))?
    }

    /// Start a background scan unless one is still running.
    fn spawn_scan(&self) {
        if self.scanning.swap(true, Ordering::SeqCst) {
            debug!("Previous scan still running, skipping tick");
            return;
        }

        let dir = self.options.input_dir.clone();
        let dispatcher = Arc::clone(&self.dispatcher);
        let cancel = self.cancel.clone();
        let scanning = Arc::clone(&self.scanning);
        tokio::task::spawn_blocking(move || {
            match scan_dir(&dir, &dispatcher, &cancel) {
                Ok(0) => {}
                Ok(count) => info!("Processed {} file(s)", count),
                Err(e) => error!("Scan of {} failed: {}", dir.display(), e),
            }
            scanning.store(false, Ordering::SeqCst);
        });
    }
}

/// Dispatch every ready file in `dir`, in name order. Stops early on
/// cancellation. Returns the number of files handed to the processor.
fn scan_dir(dir: &Path, dispatcher: &Dispatcher, cancel: &CancellationToken) -> Result<usize> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && dispatcher.filter().matches(path))
        .collect();
    files.sort();
    debug!(
        "Scanning {}, found {} matching files",
        dir.display(),
        files.len()
    );

    let mut dispatched = 0;
    for path in files {
        if cancel.is_cancelled() {
            debug!("Scan interrupted by shutdown");
            break;
        }
        if let DispatchOutcome::Processed(_) = dispatcher.dispatch(&path) {
            dispatched += 1;
        }
    }
    Ok(dispatched)
}
