use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use icms_core::{RateTable, Uf};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Read from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "icms.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown state code '{0}' in [rates]")]
    UnknownState(String),

    #[error("rate {rate} for {state} must be between 0 and 100")]
    InvalidRate { state: String, rate: Decimal },
}

/// Settings read from the TOML configuration file.
///
/// ```toml
/// log_level = "info"
///
/// [rates]
/// SP = 18
/// RJ = 22
/// ```
///
/// Every key is optional. `rates` replaces the built-in internal rate of the
/// listed states.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub rates: BTreeMap<String, Decimal>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            rates: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Parses and validates a configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.rate_table()?;
        Ok(config)
    }

    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Self::from_toml_str(&text)
    }

    /// Builds the rate table with this configuration's overrides applied.
    pub fn rate_table(&self) -> Result<RateTable, ConfigError> {
        let mut table = RateTable::new();
        for (code, rate) in &self.rates {
            let uf = Uf::parse(code).ok_or_else(|| ConfigError::UnknownState(code.clone()))?;
            if *rate < Decimal::ZERO || *rate >= Decimal::ONE_HUNDRED {
                return Err(ConfigError::InvalidRate {
                    state: code.clone(),
                    rate: *rate,
                });
            }
            table = table.with_override(uf, *rate);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // parsing tests
    // =========================================================================

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn rates_override_the_built_in_table() {
        let config = AppConfig::from_toml_str(
            r#"
            log_level = "debug"

            [rates]
            SP = 18
            BA = "19.5"
            "#,
        )
        .unwrap();

        let table = config.rate_table().unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(table.rate(Uf::Ba), dec!(19.5));
        assert!(table.is_overridden(Uf::Sp));
        assert!(!table.is_overridden(Uf::Rj));
        assert_eq!(table.rate(Uf::Rj), dec!(22));
    }

    #[test]
    fn unknown_state_is_rejected() {
        let err = AppConfig::from_toml_str("[rates]\nXX = 18").unwrap_err();

        assert!(matches!(err, ConfigError::UnknownState(ref code) if code == "XX"));
    }

    #[test]
    fn rate_of_one_hundred_is_rejected() {
        let err = AppConfig::from_toml_str("[rates]\nSP = 100").unwrap_err();

        assert!(matches!(err, ConfigError::InvalidRate { .. }));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = AppConfig::from_toml_str("log_level = ").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    // =========================================================================
    // loading tests
    // =========================================================================

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("does/not/exist.toml"))).unwrap_err();

        let ConfigError::Io { path, .. } = &err else {
            panic!("Expected Io error, got: {:?}", err);
        };
        assert_eq!(path, &PathBuf::from("does/not/exist.toml"));
    }

    #[test]
    fn explicit_file_is_read() {
        let path = std::env::temp_dir().join(format!("icms-config-{}.toml", std::process::id()));
        fs::write(&path, "[rates]\nMG = 18.5\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.rate_table().unwrap().rate(Uf::Mg), dec!(18.5));
    }
}
