//! # Duplexer Configuration
//!
//! Configuration model shared by the watcher, the pipeline and the CLI.
//!
//! Values are layered with the precedence `defaults < file < env < args`:
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ defaults │──▶│ config.toml │──▶│ environment │──▶│ CLI override │
//! └──────────┘   └─────────────┘   └─────────────┘   └──────────────┘
//! ```
//!
//! The result is validated once and then converted into the narrower types the
//! other crates consume, such as [`ReadinessPolicy`].

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod env;
pub mod error;
mod loader;
mod settings;

pub use error::{ConfigError, Result};
pub use loader::ConfigOverrides;
pub use settings::{
    DuplexerConfig, PathsConfig, ReadinessPolicy, TransformSettings, WatchSettings,
    MARKER_SUFFIX,
};
