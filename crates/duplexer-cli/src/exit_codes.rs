//! Process exit codes.

pub const SUCCESS: i32 = 0;
/// Bad invocation, configuration, missing directories or a failed transform.
pub const ERROR: i32 = 1;
/// `interleave` on an odd page count without padding.
pub const UNPAIRED_PAGES: i32 = 2;
