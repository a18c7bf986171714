//! Common test utilities for pipeline tests.

#![allow(dead_code)]

use anyhow::Result;
use duplexer_pipeline::{
    DocumentTransform, Pipeline, PipelineConfig, TransformError, ValidationError,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Content-driven stand-in for a real document format.
///
/// - empty file: `Empty`
/// - `BROKEN...`: `Unreadable`
/// - `LOCKED...`: `AccessRestricted`
/// - `ODD...`: transform fails with `UnpairedPages` after a partial write
/// - anything else: output is `duplex:` followed by the input
pub struct FakeDocument;

impl DocumentTransform for FakeDocument {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn validate(&self, input: &Path) -> Result<(), ValidationError> {
        let content = fs::read(input).map_err(|e| ValidationError::Unreadable(e.to_string()))?;
        if content.is_empty() {
            return Err(ValidationError::Empty);
        }
        if content.starts_with(b"BROKEN") {
            return Err(ValidationError::Unreadable("bad header".to_string()));
        }
        if content.starts_with(b"LOCKED") {
            return Err(ValidationError::AccessRestricted);
        }
        Ok(())
    }

    fn transform(&self, input: &Path, output: &Path) -> Result<(), TransformError> {
        let content = fs::read(input)?;
        if content.starts_with(b"ODD") {
            fs::write(output, b"partial")?;
            return Err(TransformError::UnpairedPages { count: 3 });
        }
        let mut out = b"duplex:".to_vec();
        out.extend_from_slice(&content);
        fs::write(output, out)?;
        Ok(())
    }
}

/// Temporary ingest layout: `in/`, `out/`, `in/archive`, `in/failed`.
pub struct Layout {
    pub temp: TempDir,
    pub input_dir: PathBuf,
    pub config: PipelineConfig,
}

impl Layout {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        let input_dir = temp.path().join("in");
        let output_dir = temp.path().join("out");
        fs::create_dir_all(&input_dir)?;
        fs::create_dir_all(&output_dir)?;

        let config = PipelineConfig {
            output_dir,
            archive_dir: input_dir.join("archive"),
            failed_dir: input_dir.join("failed"),
            output_suffix: ".duplex".to_string(),
        };
        Ok(Self {
            temp,
            input_dir,
            config,
        })
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.config.clone(), Arc::new(FakeDocument))
    }

    /// Write an input file into the watched directory.
    pub fn write_input(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.input_dir.join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Regular files directly in the watched directory, sorted.
    pub fn watched_files(&self) -> Vec<String> {
        list_files(&self.input_dir)
    }

    /// Regular files in the output directory, sorted.
    pub fn output_files(&self) -> Vec<String> {
        list_files(&self.config.output_dir)
    }
}

pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
