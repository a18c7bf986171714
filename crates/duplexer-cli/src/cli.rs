use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use duplexer_config::ConfigOverrides;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "duplexer")]
#[command(about = "duplexer - interleave duplex scans dropped into an ingest directory")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses LOG_LEVEL or RUST_LOG, then 'info'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch the ingest directory and process files as they become ready
    Watch(WatchArgs),

    /// Interleave a single scan and exit
    Interleave(InterleaveArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Process the files currently present, then exit
    #[arg(long)]
    pub once: bool,

    /// Config file path (defaults to ~/.config/duplexer/config.toml)
    #[arg(short = 'C', long, env = "DUPLEXER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory to watch
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Where interleaved documents are published
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Where processed originals are moved (default: <input>/archive)
    #[arg(long)]
    pub archive_dir: Option<PathBuf>,

    /// Where rejected originals are moved (default: <input>/failed)
    #[arg(long)]
    pub failed_dir: Option<PathBuf>,

    /// File name glob to watch for
    #[arg(long)]
    pub pattern: Option<String>,

    /// Seconds a file must stay unmodified before it is processed
    #[arg(long)]
    pub stability_seconds: Option<f64>,

    /// Wait for a `<file>.ready` marker instead of a quiet period
    #[arg(long, value_name = "BOOL", value_parser = parse_bool)]
    pub require_ready_file: Option<bool>,

    /// Seconds between directory scans in polling mode
    #[arg(long = "poll-interval")]
    pub poll_interval_seconds: Option<f64>,

    /// Use periodic scans instead of native file notifications
    #[arg(long)]
    pub polling: bool,
}

impl WatchArgs {
    /// Command-line layer for config loading. Unset flags leave lower layers alone.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            archive_dir: self.archive_dir.clone(),
            failed_dir: self.failed_dir.clone(),
            pattern: self.pattern.clone(),
            stability_seconds: self.stability_seconds,
            require_ready_file: self.require_ready_file,
            poll_interval_seconds: self.poll_interval_seconds,
            force_polling: self.polling.then_some(true),
            ..ConfigOverrides::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct InterleaveArgs {
    /// Scanned PDF: all fronts, then all backs
    pub input: PathBuf,

    /// Destination for the interleaved PDF
    pub output: PathBuf,

    /// Backs were scanned in reverse order
    #[arg(
        long,
        value_name = "BOOL",
        value_parser = parse_bool,
        default_value = "true",
        action = ArgAction::Set
    )]
    pub reverse_backs: bool,

    /// Pad an odd page count with a blank final back
    #[arg(long)]
    pub insert_blank_lastback: bool,
}

/// Accepts the same spellings as the environment layer, and rejects the rest.
fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{}'", other)),
    }
}
