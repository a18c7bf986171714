//! Ingest Pipeline Layer
//!
//! This crate owns what happens to a file once the watcher decides it is
//! ready: skip detection, validation, staged transform, atomic publish and
//! archive-or-fail routing.
//!
//! ## Clear Separation of Concerns
//!
//! - `duplexer-watch` decides *when* a file is processed
//! - `duplexer-pdf` knows *how* to transform a document
//! - this crate decides *where* the file ends up
//!
//! The document format is hidden behind [`DocumentTransform`], so the state
//! machine can be exercised with any collaborator.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use duplexer_pipeline::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::from_config(&config), document);
//! let result = pipeline.process(&path);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod document;
pub mod error;
pub mod fs_ops;
pub mod pipeline;

pub use document::DocumentTransform;
pub use error::{ArchiveError, PublishError, TransformError, ValidationError};
pub use pipeline::{Pipeline, PipelineConfig, PipelineResult, STAGING_PREFIX, STAGING_SUFFIX};
