use clap::Parser;
use std::process;
use tracing::error;

use duplexer_cli::{cli::Cli, exit_code_for, exit_codes, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_level);

    let code = match duplexer_cli::run(cli.command).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            exit_code_for(&e)
        }
    };
    process::exit(code);
}
