use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::settings::DuplexerConfig;

/// Values supplied on the command line. `None` keeps the lower layer's value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Watched input directory
    pub input_dir: Option<PathBuf>,
    /// Output directory
    pub output_dir: Option<PathBuf>,
    /// Archive directory
    pub archive_dir: Option<PathBuf>,
    /// Failed directory
    pub failed_dir: Option<PathBuf>,
    /// File name glob
    pub pattern: Option<String>,
    /// Stability window in seconds
    pub stability_seconds: Option<f64>,
    /// Marker mode toggle
    pub require_ready_file: Option<bool>,
    /// Polling interval in seconds
    pub poll_interval_seconds: Option<f64>,
    /// Force the polling backend
    pub force_polling: Option<bool>,
    /// Back pages are reversed
    pub reverse_backs: Option<bool>,
    /// Pad odd page counts
    pub insert_blank_lastback: Option<bool>,
    /// Output name suffix
    pub output_suffix: Option<String>,
}

impl DuplexerConfig {
    /// Load configuration with precedence: defaults < file < env < args.
    ///
    /// An explicitly named config file must exist. The default location is
    /// optional.
    pub fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self::from_file_or_default(config_file)?;
        config.apply_env()?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Default config file path: `<config dir>/duplexer/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("duplexer").join("config.toml"))
    }

    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load from `config_file`, the default location, or fall back to defaults.
    pub fn from_file_or_default(config_file: Option<&Path>) -> Result<Self> {
        let path = match config_file {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        let Some(path) = path else {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        };

        debug!(path = %path.display(), "Loading config file");
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.input_dir {
            self.paths.input_dir = dir.clone();
        }
        if let Some(dir) = &overrides.output_dir {
            self.paths.output_dir = dir.clone();
        }
        if let Some(dir) = &overrides.archive_dir {
            self.paths.archive_dir = Some(dir.clone());
        }
        if let Some(dir) = &overrides.failed_dir {
            self.paths.failed_dir = Some(dir.clone());
        }
        if let Some(pattern) = &overrides.pattern {
            self.watch.pattern = pattern.clone();
        }
        if let Some(seconds) = overrides.stability_seconds {
            self.watch.stability_seconds = seconds;
        }
        if let Some(flag) = overrides.require_ready_file {
            self.watch.require_ready_file = flag;
        }
        if let Some(seconds) = overrides.poll_interval_seconds {
            self.watch.poll_interval_seconds = seconds;
        }
        if let Some(flag) = overrides.force_polling {
            self.watch.force_polling = flag;
        }
        if let Some(flag) = overrides.reverse_backs {
            self.transform.reverse_backs = flag;
        }
        if let Some(flag) = overrides.insert_blank_lastback {
            self.transform.insert_blank_lastback = flag;
        }
        if let Some(suffix) = &overrides.output_suffix {
            self.transform.output_suffix = suffix.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DuplexerConfig::from_toml_str(
            r#"
[watch]
pattern = "*.scan.pdf"

[transform]
insert_blank_lastback = true
"#,
        )
        .unwrap();

        assert_eq!(config.watch.pattern, "*.scan.pdf");
        assert_eq!(config.watch.stability_seconds, 5.0);
        assert!(config.transform.insert_blank_lastback);
        assert!(config.transform.reverse_backs);
        assert_eq!(config.paths.input_dir, PathBuf::from("/ingest"));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = DuplexerConfig::from_toml_str("[watch\npattern = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_explicit_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");

        let err = DuplexerConfig::from_file_or_default(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_file_then_overrides() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.toml");
        std::fs::write(
            &file,
            r#"
[paths]
input_dir = "/from/file"
output_dir = "/from/file/out"

[watch]
stability_seconds = 3.0
"#,
        )
        .unwrap();

        let mut config = DuplexerConfig::from_file_or_default(Some(&file)).unwrap();
        assert_eq!(config.paths.input_dir, PathBuf::from("/from/file"));
        assert_eq!(config.watch.stability_seconds, 3.0);

        config.apply_overrides(&ConfigOverrides {
            input_dir: Some(PathBuf::from("/from/args")),
            stability_seconds: Some(0.25),
            ..Default::default()
        });

        assert_eq!(config.paths.input_dir, PathBuf::from("/from/args"));
        assert_eq!(config.paths.output_dir, PathBuf::from("/from/file/out"));
        assert_eq!(config.watch.stability_seconds, 0.25);
    }

    #[test]
    fn test_env_sits_between_file_and_args() {
        let mut config = DuplexerConfig::from_toml_str("[watch]\npattern = \"*.file\"").unwrap();
        config
            .apply_env_from(|key| (key == "SCAN_GLOB").then(|| "*.env".to_string()))
            .unwrap();
        assert_eq!(config.watch.pattern, "*.env");

        config.apply_overrides(&ConfigOverrides {
            pattern: Some("*.args".to_string()),
            ..Default::default()
        });
        assert_eq!(config.watch.pattern, "*.args");
    }
}
