//! PDF duplex interleave.
//!
//! Implements [`duplexer_pipeline::DocumentTransform`] on top of `lopdf`.
//! Page ordering lives in [`plan`] as a pure function; [`PdfDuplexer`]
//! applies it to a document by rewriting the page tree in place, which keeps
//! metadata, outlines and shared resources intact.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod duplexer;
pub mod plan;

pub use duplexer::PdfDuplexer;
pub use plan::{plan_interleave, InterleaveOptions, PageSlot};
