//! Page ordering for duplex interleave.
//!
//! A manual duplex scan produces `F1..Fn` followed by the backs, which come
//! out of the feeder last-to-first (`Bn..B1`) unless the scanner reverses
//! them. The output order is `F1, B1, F2, B2, ..., Fn, Bn`.

use duplexer_pipeline::TransformError;

/// One slot of the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    /// Zero-based index into the input pages.
    Page(usize),
    /// Blank page standing in for the missing last back.
    Blank,
}

/// Interleave behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterleaveOptions {
    /// Back pages are stored last-to-first
    pub reverse_backs: bool,
    /// Pad an odd page count with one blank back page
    pub insert_blank_lastback: bool,
}

impl Default for InterleaveOptions {
    fn default() -> Self {
        Self {
            reverse_backs: true,
            insert_blank_lastback: false,
        }
    }
}

/// Output order for a document with `total` pages.
///
/// An odd count is an error unless padding is enabled, in which case exactly
/// one blank page becomes the final back.
pub fn plan_interleave(
    total: usize,
    options: InterleaveOptions,
) -> Result<Vec<PageSlot>, TransformError> {
    let padded = total % 2 != 0;
    if padded && !options.insert_blank_lastback {
        return Err(TransformError::UnpairedPages { count: total });
    }

    let sheets = total.div_ceil(2);
    let mut backs: Vec<usize> = (sheets..total).collect();
    if options.reverse_backs {
        backs.reverse();
    }

    let mut order = Vec::with_capacity(sheets * 2);
    for sheet in 0..sheets {
        order.push(PageSlot::Page(sheet));
        match backs.get(sheet) {
            Some(&back) => order.push(PageSlot::Page(back)),
            None => order.push(PageSlot::Blank),
        }
    }
    Ok(order)
}
