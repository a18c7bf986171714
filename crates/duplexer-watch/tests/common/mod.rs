//! Common test utilities for watcher tests.

#![allow(dead_code)]

use duplexer_config::ReadinessPolicy;
use duplexer_pipeline::{DocumentTransform, PipelineResult, TransformError, ValidationError};
use duplexer_watch::{FileProcessor, WatcherOptions};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

/// Records every dispatch without touching the filesystem.
#[derive(Default)]
pub struct RecordingProcessor {
    calls: Mutex<Vec<(PathBuf, Instant)>>,
}

impl RecordingProcessor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

impl FileProcessor for RecordingProcessor {
    fn process(&self, path: &Path) -> PipelineResult {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), Instant::now()));
        PipelineResult::SkippedAlreadyProcessed
    }
}

/// Content-driven document stand-in: `BROKEN...` fails validation, anything
/// else is copied with a `duplex:` prefix.
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
        Ok(())
    }

    fn transform(&self, input: &Path, output: &Path) -> Result<(), TransformError> {
        let mut out = b"duplex:".to_vec();
        out.extend_from_slice(&fs::read(input)?);
        fs::write(output, out)?;
        Ok(())
    }
}

pub fn stability(window: Duration) -> ReadinessPolicy {
    ReadinessPolicy::Stability { window }
}

pub fn options(dir: &Path, policy: ReadinessPolicy) -> WatcherOptions {
    WatcherOptions {
        input_dir: dir.to_path_buf(),
        pattern: "*.pdf".to_string(),
        policy,
        marker_check_delay: Duration::from_millis(50),
        poll_interval: Duration::from_millis(100),
        force_polling: true,
    }
}

/// Move the file's mtime `secs` into the past.
pub fn backdate(path: &Path, secs: u64) {
    let then = SystemTime::now() - Duration::from_secs(secs);
    set_file_mtime(path, FileTime::from_system_time(then)).unwrap();
}

/// Write `content` to `dir/name` and age it by an hour.
pub fn write_stable(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    backdate(&path, 3600);
    path
}

/// Poll `condition` until it holds or `timeout` passes.
pub async fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

/// Regular files directly in `dir`, sorted.
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
