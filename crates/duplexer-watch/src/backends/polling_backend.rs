//! Interval-driven event source.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, WatchError};
use crate::events::SourceEvent;
use crate::traits::EventSource;
use crate::WatchBackend;

/// Emits [`SourceEvent::ScanTick`] every `interval`; the watcher rescans the
/// directory on each tick.
pub struct PollingBackend {
    interval: Duration,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl PollingBackend {
    /// Create an idle backend.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            cancel: None,
            task: None,
        }
    }

    /// Polling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl EventSource for PollingBackend {
    fn backend(&self) -> WatchBackend {
        WatchBackend::Polling
    }

    async fn start(&mut self, dir: &Path, sender: mpsc::UnboundedSender<SourceEvent>) -> Result<()> {
        if self.task.is_some() {
            return Err(WatchError::AlreadyRunning);
        }
        if self.interval.is_zero() {
            return Err(WatchError::Config("poll interval must be positive".to_string()));
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if sender.send(SourceEvent::ScanTick).is_err() {
                            debug!("Scan tick receiver dropped");
                            break;
                        }
                    }
                }
            }
        });

        self.cancel = Some(cancel);
        self.task = Some(task);
        info!(
            "Watching {} with polling (interval={:.1}s)",
            dir.display(),
            period.as_secs_f64()
        );
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Polling task ended abnormally: {}", e);
            }
            info!("Polling watcher stopped");
        }
        Ok(())
    }
}
