//! Readiness decisions for candidate input files.
//!
//! Attributes are read from the filesystem on every call and never cached.

use duplexer_config::ReadinessPolicy;
use duplexer_pipeline::fs_ops::marker_path;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

use crate::error::StabilityCheckError;

/// Decides whether a file is safe to process right now.
#[derive(Debug, Clone, Copy)]
pub struct StabilityOracle {
    policy: ReadinessPolicy,
}

impl StabilityOracle {
    /// Create an oracle for `policy`.
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self { policy }
    }

    /// Active policy.
    pub fn policy(&self) -> ReadinessPolicy {
        self.policy
    }

    /// Readiness check that swallows errors. Anything that cannot be
    /// determined counts as not ready.
    pub fn is_ready(&self, path: &Path) -> bool {
        match self.check(path) {
            Ok(ready) => ready,
            Err(e) => {
                debug!("{}", e);
                false
            }
        }
    }

    /// Readiness check. A missing file is `Ok(false)`.
    pub fn check(&self, path: &Path) -> Result<bool, StabilityCheckError> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} vanished before readiness check", path.display());
                return Ok(false);
            }
            Err(source) => {
                return Err(StabilityCheckError {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if !metadata.is_file() {
            return Ok(false);
        }

        match self.policy {
            ReadinessPolicy::Marker => {
                let ready = marker_path(path).exists();
                if ready {
                    debug!("Found ready file for {}", path.display());
                }
                Ok(ready)
            }
            ReadinessPolicy::Stability { window } => {
                let modified = metadata.modified().map_err(|source| StabilityCheckError {
                    path: path.to_path_buf(),
                    source,
                })?;
                // An mtime in the future counts as just modified.
                let age = SystemTime::now()
                    .duration_since(modified)
                    .unwrap_or(Duration::ZERO);
                let stable = age >= window;
                debug!(
                    "{} {} (modified {:.1}s ago, window {:.1}s)",
                    path.display(),
                    if stable { "is stable" } else { "is not stable yet" },
                    age.as_secs_f64(),
                    window.as_secs_f64()
                );
                Ok(stable)
            }
        }
    }
}
