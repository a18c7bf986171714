//! Subscriber setup for the binary. Library crates only emit events.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Variable read before `RUST_LOG`, kept for existing deployments.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Pick the filter: `-v` wins, then `--log-level`, then `LOG_LEVEL`, then
/// `RUST_LOG`, then `info`.
pub fn build_filter<F>(verbose: bool, level: Option<LogLevel>, lookup: F) -> EnvFilter
where
    F: Fn(&str) -> Option<String>,
{
    if verbose {
        return EnvFilter::default().add_directive(LevelFilter::DEBUG.into());
    }
    if let Some(level) = level {
        return EnvFilter::default().add_directive(LevelFilter::from(level).into());
    }

    [LOG_LEVEL_ENV, EnvFilter::DEFAULT_ENV]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find_map(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::INFO.into()))
}

/// Install the global subscriber. Logs go to stderr so stdout stays usable.
pub fn init(verbose: bool, level: Option<LogLevel>) {
    let filter = build_filter(verbose, level, |key| std::env::var(key).ok());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_verbose_forces_debug() {
        let filter = build_filter(true, Some(LogLevel::Warn), lookup(&[("LOG_LEVEL", "error")]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_flag_beats_environment() {
        let filter = build_filter(false, Some(LogLevel::Warn), lookup(&[("LOG_LEVEL", "trace")]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_log_level_beats_rust_log() {
        let filter = build_filter(
            false,
            None,
            lookup(&[("LOG_LEVEL", "error"), ("RUST_LOG", "trace")]),
        );
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_defaults_to_info() {
        let filter = build_filter(false, None, lookup(&[]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
