use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Suffix of the sidecar file that marks an input as complete.
pub const MARKER_SUFFIX: &str = ".ready";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplexerConfig {
    /// Directory layout
    #[serde(default)]
    pub paths: PathsConfig,
    /// Watch and readiness settings
    #[serde(default)]
    pub watch: WatchSettings,
    /// Document transform settings
    #[serde(default)]
    pub transform: TransformSettings,
}

/// Directory layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Watched input directory
    pub input_dir: PathBuf,
    /// Destination for published outputs
    pub output_dir: PathBuf,
    /// Destination for originals after success (defaults to `<input_dir>/archive`)
    pub archive_dir: Option<PathBuf>,
    /// Destination for originals after failure (defaults to `<input_dir>/failed`)
    pub failed_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("/ingest"),
            output_dir: PathBuf::from("/completed"),
            archive_dir: None,
            failed_dir: None,
        }
    }
}

impl PathsConfig {
    /// Resolved archive directory.
    pub fn archive_dir(&self) -> PathBuf {
        self.archive_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join("archive"))
    }

    /// Resolved failed directory.
    pub fn failed_dir(&self) -> PathBuf {
        self.failed_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join("failed"))
    }
}

/// Watch and readiness settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Glob matched against file names in the input directory
    pub pattern: String,
    /// Seconds since last modification before a file counts as stable
    pub stability_seconds: f64,
    /// Wait for a `<file>.ready` marker instead of using the stability window
    pub require_ready_file: bool,
    /// Interval between scans in polling mode
    pub poll_interval_seconds: f64,
    /// Skip native notifications and always poll
    pub force_polling: bool,
    /// Delay before the readiness check in marker mode
    pub marker_check_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            pattern: "*.pdf".to_string(),
            stability_seconds: 5.0,
            require_ready_file: false,
            poll_interval_seconds: 2.0,
            force_polling: false,
            marker_check_ms: 1000,
        }
    }
}

/// Document transform settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Back pages were scanned last-to-first
    pub reverse_backs: bool,
    /// Pad an odd page count with one blank back page
    pub insert_blank_lastback: bool,
    /// Inserted between the input stem and extension for the output name
    pub output_suffix: String,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            reverse_backs: true,
            insert_blank_lastback: false,
            output_suffix: ".duplex".to_string(),
        }
    }
}

/// How the watcher decides that a file may be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessPolicy {
    /// Ready once the file has not been modified for `window`.
    Stability {
        /// Quiet period required after the last modification
        window: Duration,
    },
    /// Ready once a `<file>.ready` sidecar exists.
    Marker,
}

impl DuplexerConfig {
    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        let watch = &self.watch;
        if !watch.stability_seconds.is_finite() || watch.stability_seconds < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "stability_seconds must be a non-negative number, got {}",
                watch.stability_seconds
            )));
        }
        if Duration::try_from_secs_f64(watch.stability_seconds).is_err() {
            return Err(ConfigError::Invalid(format!(
                "stability_seconds is too large, got {}",
                watch.stability_seconds
            )));
        }
        if !watch.poll_interval_seconds.is_finite() || watch.poll_interval_seconds <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "poll_interval_seconds must be positive, got {}",
                watch.poll_interval_seconds
            )));
        }
        if Duration::try_from_secs_f64(watch.poll_interval_seconds).is_err() {
            return Err(ConfigError::Invalid(format!(
                "poll_interval_seconds is too large, got {}",
                watch.poll_interval_seconds
            )));
        }
        if watch.pattern.trim().is_empty() {
            return Err(ConfigError::Invalid("pattern must not be empty".to_string()));
        }

        let suffix = &self.transform.output_suffix;
        if suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "output_suffix must not be empty".to_string(),
            ));
        }
        if suffix.contains('/') || suffix.contains('\\') {
            return Err(ConfigError::Invalid(format!(
                "output_suffix must not contain path separators: {suffix:?}"
            )));
        }
        Ok(())
    }

    /// The single readiness policy in effect.
    pub fn readiness_policy(&self) -> ReadinessPolicy {
        if self.watch.require_ready_file {
            ReadinessPolicy::Marker
        } else {
            ReadinessPolicy::Stability {
                window: self.stability_window(),
            }
        }
    }

    /// Stability window as a [`Duration`]. Out-of-range values saturate, so an
    /// unvalidated config errs towards waiting.
    pub fn stability_window(&self) -> Duration {
        Duration::try_from_secs_f64(self.watch.stability_seconds).unwrap_or(Duration::MAX)
    }

    /// Polling interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.watch.poll_interval_seconds)
            .unwrap_or(Duration::from_secs(2))
    }

    /// Delay between a marker-mode notification and its readiness check.
    pub fn marker_check_delay(&self) -> Duration {
        Duration::from_millis(self.watch.marker_check_ms)
    }
}
