//! Ingest Pipeline Orchestrator
//!
//! Moves one input file through its terminal states:
//!
//! 1. **Idempotency**: skip inputs that already have an output or archive copy
//! 2. **Validate**: reject malformed documents before any output is staged
//! 3. **Transform**: write into a temporary file inside the output directory
//! 4. **Publish**: atomically rename the temporary file onto the final name
//! 5. **Archive**: move the original out of the watched directory
//! 6. **Cleanup**: remove the `.ready` marker
//!
//! Validation, transform and publish failures move the original to the
//! failed directory. An archive failure keeps the published output and leaves
//! the original where it is.

use duplexer_config::DuplexerConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::document::DocumentTransform;
use crate::error::{ArchiveError, PublishError, TransformError, ValidationError};
use crate::fs_ops;

/// Name prefix of staged outputs inside the output directory.
pub const STAGING_PREFIX: &str = ".duplexer-";
/// Name suffix of staged outputs.
pub const STAGING_SUFFIX: &str = ".partial";

/// Directories and naming used by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Where published outputs go
    pub output_dir: PathBuf,
    /// Where originals go after success
    pub archive_dir: PathBuf,
    /// Where originals go after failure
    pub failed_dir: PathBuf,
    /// Inserted between stem and extension of the output name
    pub output_suffix: String,
}

impl PipelineConfig {
    /// Derive pipeline settings from the loaded configuration.
    pub fn from_config(config: &DuplexerConfig) -> Self {
        Self {
            output_dir: config.paths.output_dir.clone(),
            archive_dir: config.paths.archive_dir(),
            failed_dir: config.paths.failed_dir(),
            output_suffix: config.transform.output_suffix.clone(),
        }
    }

    /// Final output path for `input`.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        fs_ops::output_path_for(input, &self.output_dir, &self.output_suffix)
    }
}

/// Outcome of [`Pipeline::process`].
#[derive(Debug)]
pub enum PipelineResult {
    /// Output published. `archived` is `None` if the original could not be
    /// archived and is still in the watched directory.
    Success {
        /// Published output
        output: PathBuf,
        /// Archived original, if the archive move succeeded
        archived: Option<PathBuf>,
    },
    /// Output or archive already holds this input. Nothing was touched.
    SkippedAlreadyProcessed,
    /// Input rejected before staging.
    ValidationFailed(ValidationError),
    /// Transform failed; staged output discarded.
    TransformFailed(TransformError),
    /// Staging or rename failed.
    PublishFailed(PublishError),
}

impl PipelineResult {
    /// Whether an output was published.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether the original was routed to the failed directory.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed(_) | Self::TransformFailed(_) | Self::PublishFailed(_)
        )
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::SkippedAlreadyProcessed => "skipped",
            Self::ValidationFailed(_) => "validation_failed",
            Self::TransformFailed(_) => "transform_failed",
            Self::PublishFailed(_) => "publish_failed",
        }
    }
}

/// The transactional core: one call per input file.
///
/// ```text
/// Pipeline
///   ├─> fs_ops::already_processed   (skip)
///   ├─> DocumentTransform::validate
///   ├─> DocumentTransform::transform (into staged temp file)
///   ├─> rename                       (publish)
///   └─> fs_ops::safe_move            (archive / failed)
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    document: Arc<dyn DocumentTransform>,
}

impl Pipeline {
    /// Create a pipeline around a document collaborator.
    pub fn new(config: PipelineConfig, document: Arc<dyn DocumentTransform>) -> Self {
        Self { config, document }
    }

    /// Pipeline settings.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Delete staged outputs left in the output directory by a run that was
    /// killed mid-transform. Call before any processing starts. Returns the
    /// number of files removed.
    pub fn remove_stale_staging(&self) -> usize {
        let entries = match fs::read_dir(&self.config.output_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(
                    "Cannot list {} for stale staged outputs: {}",
                    self.config.output_dir.display(),
                    e
                );
                return 0;
            }
        };

        let mut removed = 0;
        for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
            if !is_staged_output(&path) || !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!("Removed stale staged output {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove stale {}: {}", path.display(), e),
            }
        }
        removed
    }

    /// Process one input file to completion.
    ///
    /// Blocks on filesystem IO and on the document transform. Never panics on
    /// per-file errors; every failure is reported through the result.
    pub fn process(&self, input: &Path) -> PipelineResult {
        let start = Instant::now();
        info!("Processing: {}", input.display());

        if fs_ops::already_processed(
            input,
            &self.config.output_dir,
            &self.config.archive_dir,
            &self.config.output_suffix,
        ) {
            info!("Skipping {} (already processed)", input.display());
            return PipelineResult::SkippedAlreadyProcessed;
        }

        if let Err(err) = self.document.validate(input) {
            error!("Validation failed for {}: {}", input.display(), err);
            self.route_to_failed(input);
            return PipelineResult::ValidationFailed(err);
        }

        let staged = match self.stage() {
            Ok(staged) => staged,
            Err(err) => {
                error!("{}", err);
                self.route_to_failed(input);
                return PipelineResult::PublishFailed(err);
            }
        };
        debug!("Staging output at {}", staged.path().display());

        let transform_start = Instant::now();
        if let Err(err) = self.document.transform(input, staged.path()) {
            error!(
                "{} transform failed for {}: {}",
                self.document.name(),
                input.display(),
                err
            );
            discard(staged);
            self.route_to_failed(input);
            return PipelineResult::TransformFailed(err);
        }
        let transform_ms = transform_start.elapsed().as_millis() as u64;

        let output = self.config.output_path_for(input);
        if let Err(err) = publish(staged, &output) {
            error!("{}", err);
            self.route_to_failed(input);
            return PipelineResult::PublishFailed(err);
        }
        info!("Wrote {}", output.display());

        let archived = match self.archive(input) {
            Ok(dest) => {
                fs_ops::remove_marker(input);
                Some(dest)
            }
            Err(err) => {
                warn!("Failed to archive {}: {}", input.display(), err.source);
                None
            }
        };

        info!(
            "Completed {} in {}ms (transform:{}ms)",
            input.display(),
            start.elapsed().as_millis() as u64,
            transform_ms
        );

        PipelineResult::Success { output, archived }
    }

    fn stage(&self) -> Result<NamedTempFile, PublishError> {
        tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.config.output_dir)
            .map_err(|source| PublishError::Stage {
                dir: self.config.output_dir.clone(),
                source,
            })
    }

    fn archive(&self, input: &Path) -> Result<PathBuf, ArchiveError> {
        fs_ops::safe_move(input, &self.config.archive_dir).map_err(|source| ArchiveError {
            path: input.to_path_buf(),
            source,
        })
    }

    /// Move the original to the failed directory. The marker is only removed
    /// once the original is gone from the watched directory.
    fn route_to_failed(&self, input: &Path) {
        match fs_ops::safe_move(input, &self.config.failed_dir) {
            Ok(_) => {
                fs_ops::remove_marker(input);
            }
            Err(e) => error!(
                "Failed to move {} to {}: {}; file left in place",
                input.display(),
                self.config.failed_dir.display(),
                e
            ),
        }
    }
}

/// Rename the staged file onto `target`. On failure the staged file is
/// deleted when the returned handle drops.
fn publish(staged: NamedTempFile, target: &Path) -> Result<(), PublishError> {
    staged
        .persist(target)
        .map(|_| ())
        .map_err(|e| PublishError::Rename {
            target: target.to_path_buf(),
            source: e.error,
        })
}

fn is_staged_output(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(STAGING_PREFIX) && name.ends_with(STAGING_SUFFIX))
}

fn discard(staged: NamedTempFile) {
    let path = staged.path().to_path_buf();
    if let Err(e) = staged.close() {
        warn!("Failed to remove staged output {}: {}", path.display(), e);
    }
}
