//! The document collaborator seen by the pipeline.

use std::path::Path;

use crate::error::{TransformError, ValidationError};

/// Format-specific validation and transformation.
///
/// Both calls are synchronous and may block on file IO. Implementations must
/// not touch the input file beyond reading it, and must write the complete
/// result to `output` (which already exists and may be truncated).
pub trait DocumentTransform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Check that `input` is well-formed, accessible and non-empty.
    fn validate(&self, input: &Path) -> Result<(), ValidationError>;

    /// Write the transformed document for `input` to `output`.
    fn transform(&self, input: &Path, output: &Path) -> Result<(), TransformError>;
}
