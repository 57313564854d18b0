//! TOML configuration for the interactive tool.
//!
//! Every section is optional; a missing file section falls back to its defaults.
//!
//! ```toml
//! [loader]
//! default_format = "json"
//!
//! [stats]
//! list_numeric_policy = "dual-count"
//!
//! [logging]
//! file = "data-filter.log"
//! alert_at_or_above = "error"
//!
//! [display]
//! max_rows = 50
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::ingestion::{
    CompositeObserver, FileObserver, IngestionFormat, IngestionOptions, IngestionSeverity, LogObserver,
};
use crate::processing::{ListNumericPolicy, StatsOptions};

/// Error type returned while reading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub loader: LoaderConfig,
    pub stats: StatsConfig,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Format name used for paths without an extension.
    pub default_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsConfig {
    pub list_numeric_policy: ListNumericPolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Optional file that load/save events are appended to.
    pub file: Option<PathBuf>,
    pub alert_at_or_above: IngestionSeverity,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Maximum rows/records printed by `display`; 0 means unlimited.
    pub max_rows: usize,
}

impl Config {
    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_format()?;
        if let Some(file) = &self.logging.file {
            if file.as_os_str().is_empty() {
                return Err(ConfigError::Invalid {
                    message: "logging.file must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// The configured fallback format, if any.
    pub fn default_format(&self) -> Result<Option<IngestionFormat>, ConfigError> {
        let Some(name) = self.loader.default_format.as_deref() else {
            return Ok(None);
        };
        match IngestionFormat::from_extension(name) {
            Some(format) => Ok(Some(format)),
            None if name.eq_ignore_ascii_case("yaml") || name.eq_ignore_ascii_case("yml") => {
                Err(ConfigError::Invalid {
                    message: "loader.default_format 'yaml' is not supported yet".to_string(),
                })
            }
            None => Err(ConfigError::Invalid {
                message: format!("loader.default_format '{name}' must be one of csv, json, xml"),
            }),
        }
    }

    pub fn stats_options(&self) -> StatsOptions {
        StatsOptions {
            list_numeric_policy: self.stats.list_numeric_policy,
        }
    }

    /// Load/save options with a [`LogObserver`] and, when configured, a [`FileObserver`].
    pub fn ingestion_options(&self) -> IngestionOptions {
        let mut observer = CompositeObserver::default();
        observer.push(Arc::new(LogObserver));
        if let Some(file) = &self.logging.file {
            observer.push(Arc::new(FileObserver::new(file)));
        }
        IngestionOptions {
            format: None,
            // validate() has already rejected unknown names
            fallback_format: self.default_format().ok().flatten(),
            observer: Some(Arc::new(observer)),
            alert_at_or_above: self.logging.alert_at_or_above,
        }
    }

    /// Row limit for display, `None` when unlimited.
    pub fn display_limit(&self) -> Option<usize> {
        (self.display.max_rows > 0).then_some(self.display.max_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.stats_options(), StatsOptions::default());
        assert_eq!(config.display_limit(), None);
        assert_eq!(config.logging.alert_at_or_above, IngestionSeverity::Critical);
    }

    #[test]
    fn parses_every_section() {
        let config = Config::from_toml_str(
            r#"
            [loader]
            default_format = "XML"

            [stats]
            list_numeric_policy = "dual-count"

            [logging]
            file = "events.log"
            alert_at_or_above = "error"

            [display]
            max_rows = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.default_format().unwrap(), Some(IngestionFormat::Xml));
        assert_eq!(config.stats.list_numeric_policy, ListNumericPolicy::DualCount);
        assert_eq!(config.logging.alert_at_or_above, IngestionSeverity::Error);
        assert_eq!(config.display_limit(), Some(5));

        let opts = config.ingestion_options();
        assert_eq!(opts.fallback_format, Some(IngestionFormat::Xml));
        assert!(opts.observer.is_some());
    }

    #[test]
    fn yaml_is_reported_as_unsupported() {
        let err = Config::from_toml_str("[loader]\ndefault_format = \"yaml\"\n").unwrap_err();
        assert!(err.to_string().contains("'yaml' is not supported"));
    }

    #[test]
    fn unknown_keys_and_empty_log_file_are_rejected() {
        assert!(matches!(
            Config::from_toml_str("[display]\nrows = 3\n"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[logging]\nfile = \"\"\n"),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
