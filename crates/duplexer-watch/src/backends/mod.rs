//! Event source implementations.

mod notify_backend;
mod polling_backend;

pub use notify_backend::NotifyBackend;
pub use polling_backend::PollingBackend;
