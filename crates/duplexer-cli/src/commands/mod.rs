pub mod interleave;
pub mod watch;
