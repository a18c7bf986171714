//! Environment variable overrides.
//!
//! Variable names follow the container deployment (`SCAN_GLOB`,
//! `FILE_STABILITY_SECONDS`, ...). Lookups go through a closure so tests can
//! supply a map instead of mutating the process environment.

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::settings::DuplexerConfig;

pub(crate) const INGEST_DIR: &str = "INGEST_DIR";
pub(crate) const COMPLETED_DIR: &str = "COMPLETED_DIR";
pub(crate) const ARCHIVE_DIR: &str = "ARCHIVE_DIR";
pub(crate) const FAILED_DIR: &str = "FAILED_DIR";
pub(crate) const SCAN_GLOB: &str = "SCAN_GLOB";
pub(crate) const FILE_STABILITY_SECONDS: &str = "FILE_STABILITY_SECONDS";
pub(crate) const REQUIRE_READY_FILE: &str = "REQUIRE_READY_FILE";
pub(crate) const POLL_INTERVAL_SECONDS: &str = "POLL_INTERVAL_SECONDS";
pub(crate) const FORCE_POLLING: &str = "FORCE_POLLING";
pub(crate) const REVERSE_BACKS: &str = "REVERSE_BACKS";
pub(crate) const INSERT_BLANK_LASTBACK: &str = "INSERT_BLANK_LASTBACK";
pub(crate) const OUTPUT_SUFFIX: &str = "OUTPUT_SUFFIX";

/// `true`, `1`, `yes` and `on` (any case) are true. Everything else is false.
pub(crate) fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn parse_seconds(key: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

impl DuplexerConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(INGEST_DIR) {
            self.paths.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(COMPLETED_DIR) {
            self.paths.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ARCHIVE_DIR) {
            self.paths.archive_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(FAILED_DIR) {
            self.paths.failed_dir = Some(PathBuf::from(dir));
        }

        if let Some(pattern) = lookup(SCAN_GLOB) {
            self.watch.pattern = pattern;
        }
        if let Some(raw) = lookup(FILE_STABILITY_SECONDS) {
            self.watch.stability_seconds = parse_seconds(FILE_STABILITY_SECONDS, &raw)?;
        }
        if let Some(raw) = lookup(REQUIRE_READY_FILE) {
            self.watch.require_ready_file = parse_flag(&raw);
        }
        if let Some(raw) = lookup(POLL_INTERVAL_SECONDS) {
            self.watch.poll_interval_seconds = parse_seconds(POLL_INTERVAL_SECONDS, &raw)?;
        }
        if let Some(raw) = lookup(FORCE_POLLING) {
            self.watch.force_polling = parse_flag(&raw);
        }

        if let Some(raw) = lookup(REVERSE_BACKS) {
            self.transform.reverse_backs = parse_flag(&raw);
        }
        if let Some(raw) = lookup(INSERT_BLANK_LASTBACK) {
            self.transform.insert_blank_lastback = parse_flag(&raw);
        }
        if let Some(suffix) = lookup(OUTPUT_SUFFIX) {
            self.transform.output_suffix = suffix;
        }

        Ok(())
    }
}
