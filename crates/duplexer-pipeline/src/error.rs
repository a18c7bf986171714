//! Error taxonomy for a single pipeline run.
//!
//! Every error here except [`ArchiveError`] ends the run and sends the
//! original to the failed directory.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The input is not a document the transform can work with.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Malformed or unreadable input.
    #[error("unreadable document: {0}")]
    Unreadable(String),

    /// The document is encrypted or otherwise access-restricted.
    #[error("document is encrypted")]
    AccessRestricted,

    /// The document has no content to transform.
    #[error("document has no pages")]
    Empty,
}

/// The transform could not produce an output.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Odd record count with padding disabled.
    #[error("page count {count} is odd and blank padding is disabled")]
    UnpairedPages {
        /// Number of pages in the input.
        count: usize,
    },

    /// Reading the input failed.
    #[error("failed to read input: {0}")]
    Read(String),

    /// Writing the output failed.
    #[error("failed to write output: {0}")]
    Write(String),

    /// IO error during the transform.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The output could not be staged or moved into place.
#[derive(Error, Debug)]
pub enum PublishError {
    /// The temporary output file could not be created.
    #[error("failed to create temporary output in {}: {source}", dir.display())]
    Stage {
        /// Output directory.
        dir: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The atomic rename onto the final name failed.
    #[error("failed to publish {}: {source}", target.display())]
    Rename {
        /// Final output path.
        target: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// The original could not be moved into the archive.
#[derive(Error, Debug)]
#[error("failed to archive {}: {source}", path.display())]
pub struct ArchiveError {
    /// Input that stayed in place.
    pub path: PathBuf,
    /// Underlying IO error.
    #[source]
    pub source: io::Error,
}
