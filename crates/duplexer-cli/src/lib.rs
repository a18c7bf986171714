//! # Duplexer CLI
//!
//! `duplexer watch` runs the ingest watcher; `duplexer interleave` converts a
//! single scan. Exit codes live in [`exit_codes`].

pub mod cli;
pub mod commands;
pub mod exit_codes;
pub mod logging;
pub mod signal;

use anyhow::Result;
use duplexer_pipeline::TransformError;

use cli::Commands;

/// Execute one subcommand.
pub async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Watch(args) => commands::watch::execute(args).await,
        Commands::Interleave(args) => commands::interleave::execute(args),
    }
}

/// Exit code for a failed command.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    let unpaired = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<TransformError>(),
            Some(TransformError::UnpairedPages { .. })
        )
    });
    if unpaired {
        exit_codes::UNPAIRED_PAGES
    } else {
        exit_codes::ERROR
    }
}
