//! Configuration management for finplan
//!
//! Settings are read from a YAML file. Every section and field has a default,
//! so an empty file gives a working configuration.

pub mod error;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Data file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON document loaded into the ledger at startup
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./ledger.json")
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Before,
    After,
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Symbol printed next to amounts
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator, empty for none
    #[serde(default)]
    pub thousands_separator: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default)]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimal_places: default_decimal_places(),
            thousands_separator: String::new(),
            symbol_position: SymbolPosition::Before,
        }
    }
}

fn default_symbol() -> String {
    "€".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Table display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// chrono format string for dates
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Data file settings
    #[serde(default)]
    pub data: DataConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        // An empty document deserializes to unit, not to a mapping
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!(
                    "'{}' is not one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        let format = &self.display.date_format;
        if format.trim().is_empty() || !formats_dates(format) {
            return Err(ConfigError::InvalidValue {
                field: "display.date_format".to_string(),
                reason: format!("'{}' is not a valid date format", format),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

/// A format renders dates only if it uses no time or zone fields
fn formats_dates(format: &str) -> bool {
    let mut rendered = String::new();
    NaiveDate::from_ymd_opt(2000, 12, 31)
        .map_or(false, |date| write!(rendered, "{}", date.format(format)).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.path, PathBuf::from("./ledger.json"));
        assert_eq!(config.currency.symbol, "€");
        assert_eq!(config.currency.decimal_places, 2);
        assert_eq!(config.currency.symbol_position, SymbolPosition::Before);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.display.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "currency:\n  symbol: \"$\"\n  symbol_position: after\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.currency.symbol, "$");
        assert_eq!(config.currency.symbol_position, SymbolPosition::After);
        assert_eq!(config.currency.decimal_places, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_yaml("currency:\n  decimal_places: 11\n").unwrap_err();
        assert_eq!(err.code(), error::ConfigErrorCode::InvalidValue);

        let err = Config::from_yaml("logging:\n  level: loud\n").unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_load_failure_details_name_the_field() {
        let err = Config::from_yaml("logging:\n  level: loud\n").unwrap_err();
        let details = err.to_details();
        assert_eq!(details.field.as_deref(), Some("logging.level"));
        assert!(details.to_string().starts_with("[INVALID_VALUE]"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Config::from_yaml("currency: [unclosed").unwrap_err();
        assert_eq!(err.code(), error::ConfigErrorCode::InvalidYaml);
    }

    #[test]
    fn test_generated_default_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.currency.decimal_places, 2);
        assert_eq!(config.data.path, PathBuf::from("./ledger.json"));
    }

    #[test]
    fn test_bad_date_format_rejected() {
        let err = Config::from_yaml("display:\n  date_format: \"%Q\"\n").unwrap_err();
        assert!(err.to_string().contains("display.date_format"));
        assert!(Config::from_yaml("display:\n  date_format: \"%d.%m.%Y\"\n").is_ok());

        for time_only in ["%H:%M", "%Y-%m-%d %H:%M:%S", "%d %b %Y %z"] {
            let yaml = format!("display:\n  date_format: \"{}\"\n", time_only);
            let err = Config::from_yaml(&yaml).unwrap_err();
            assert_eq!(err.code(), error::ConfigErrorCode::InvalidValue, "format {}", time_only);
        }
    }

    #[test]
    fn test_unreadable_file() {
        let err = Config::load(Path::new("/nonexistent/finplan.yaml")).unwrap_err();
        assert_eq!(err.code(), error::ConfigErrorCode::IoError);
    }
}
