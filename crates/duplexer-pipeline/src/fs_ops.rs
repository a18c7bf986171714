//! Filesystem helpers for routing files between the ingest directories.

use duplexer_config::MARKER_SUFFIX;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Create `path` and its parents if missing.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
        debug!("Created directory: {}", path.display());
    }
    Ok(())
}

/// `<output_dir>/<stem><suffix><ext>` for `input`.
///
/// `scan.pdf` with suffix `.duplex` becomes `scan.duplex.pdf`.
pub fn output_path_for(input: &Path, output_dir: &Path, output_suffix: &str) -> PathBuf {
    let mut name = input.file_stem().map(OsString::from).unwrap_or_default();
    name.push(output_suffix);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    output_dir.join(name)
}

/// Sidecar marker for `path`: the full file name plus `.ready`.
pub fn marker_path(path: &Path) -> PathBuf {
    let mut marker = path.as_os_str().to_os_string();
    marker.push(MARKER_SUFFIX);
    PathBuf::from(marker)
}

/// Whether `path` is itself a marker file.
pub fn is_marker(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(MARKER_SUFFIX))
        .unwrap_or(false)
}

/// Remove the marker for `path` if present. Returns whether one was removed.
pub fn remove_marker(path: &Path) -> bool {
    let marker = marker_path(path);
    match fs::remove_file(&marker) {
        Ok(()) => {
            debug!("Removed ready file: {}", marker.display());
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Failed to remove ready file {}: {}", marker.display(), e);
            false
        }
    }
}

/// Whether `input` already has a processed artifact.
///
/// True when the output exists and is at least as new as the input, or when
/// a file with the input's name is already in the archive.
pub fn already_processed(
    input: &Path,
    output_dir: &Path,
    archive_dir: &Path,
    output_suffix: &str,
) -> bool {
    let output = output_path_for(input, output_dir, output_suffix);
    if output.exists() {
        match (modified(input), modified(&output)) {
            (Ok(input_mtime), Ok(output_mtime)) if output_mtime >= input_mtime => {
                debug!(
                    "{} already processed (output {} is newer)",
                    input.display(),
                    output.display()
                );
                return true;
            }
            (Ok(_), Ok(_)) => {}
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to compare timestamps for {}: {}", input.display(), e);
            }
        }
    }

    if let Some(name) = input.file_name() {
        if archive_dir.join(name).exists() {
            debug!("{} already archived", input.display());
            return true;
        }
    }

    false
}

fn modified(path: &Path) -> io::Result<std::time::SystemTime> {
    fs::metadata(path)?.modified()
}

/// First free name for `file_name` in `dest_dir`: `name.ext`, then
/// `name_1.ext`, `name_2.ext`, ...
pub fn unique_destination(dest_dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dest_dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let candidate = dest_dir.join(format!("{stem}_{counter}{ext}"));
        if !candidate.exists() {
            debug!("Destination exists, using: {}", candidate.display());
            return candidate;
        }
        counter += 1;
    }
}

/// Move `source` into `dest_dir` without overwriting anything there.
///
/// Returns the final destination.
pub fn safe_move(source: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    ensure_dir(dest_dir)?;
    let file_name = source.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", source.display()),
        )
    })?;

    let dest = unique_destination(dest_dir, Path::new(file_name));
    fs::rename(source, &dest)?;
    info!("Moved {} -> {}", source.display(), dest.display());
    Ok(dest)
}
