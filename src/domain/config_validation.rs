//! Configuration validation.
//!
//! Validates the INI sections before any adapter is built.

use crate::domain::error::StockfolioError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_POOL_SIZE: i64 = 4;
pub const DEFAULT_LOG_LEVEL: &str = "info";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    validate_database(config)?;
    validate_market_data(config)?;
    validate_logging(config)?;
    Ok(())
}

pub fn validate_database(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    require_path(config, "sqlite", "path")?;
    let pool_size = config.get_int("sqlite", "pool_size", DEFAULT_POOL_SIZE);
    if !(1..=64).contains(&pool_size) {
        return Err(StockfolioError::ConfigInvalid {
            section: "sqlite".to_string(),
            key: "pool_size".to_string(),
            reason: "pool_size must be between 1 and 64".to_string(),
        });
    }
    Ok(())
}

pub fn validate_market_data(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    require_path(config, "market_data", "path")?;
    Ok(())
}

pub fn validate_logging(config: &dyn ConfigPort) -> Result<(), StockfolioError> {
    if let Some(level) = config.get_string("logging", "level") {
        let level = level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(StockfolioError::ConfigInvalid {
                section: "logging".to_string(),
                key: "level".to_string(),
                reason: format!("level must be one of {}", LOG_LEVELS.join(", ")),
            });
        }
    }
    Ok(())
}

/// Configured log level, lower-cased, falling back to `info`.
pub fn log_level(config: &dyn ConfigPort) -> String {
    config
        .get_string("logging", "level")
        .map(|l| l.trim().to_lowercase())
        .filter(|l| LOG_LEVELS.contains(&l.as_str()))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

fn require_path(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), StockfolioError> {
    match config.get_path(section, key) {
        Some(_) => Ok(()),
        None => Err(StockfolioError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            MapConfig(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }
        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
    }

    fn valid() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("sqlite", "path", "/tmp/stockfolio.db"),
            ("market_data", "path", "/tmp/history"),
        ]
    }

    #[test]
    fn minimal_config_is_valid() {
        assert!(validate_config(&MapConfig::new(&valid())).is_ok());
    }

    #[test]
    fn missing_sqlite_path() {
        let config = MapConfig::new(&[("market_data", "path", "/tmp/history")]);
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, StockfolioError::ConfigMissing { section, key } if section == "sqlite" && key == "path")
        );
    }

    #[test]
    fn blank_market_data_path_counts_as_missing() {
        let config = MapConfig::new(&[("sqlite", "path", "a.db"), ("market_data", "path", "  ")]);
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, StockfolioError::ConfigMissing { section, .. } if section == "market_data"));
    }

    #[test]
    fn pool_size_out_of_range() {
        let mut entries = valid();
        entries.push(("sqlite", "pool_size", "0"));
        let err = validate_config(&MapConfig::new(&entries)).unwrap_err();
        assert!(matches!(err, StockfolioError::ConfigInvalid { key, .. } if key == "pool_size"));
    }

    #[test]
    fn unknown_log_level() {
        let mut entries = valid();
        entries.push(("logging", "level", "chatty"));
        let err = validate_config(&MapConfig::new(&entries)).unwrap_err();
        assert!(matches!(err, StockfolioError::ConfigInvalid { section, .. } if section == "logging"));
    }

    #[test]
    fn log_level_defaults_to_info() {
        assert_eq!(log_level(&MapConfig::new(&valid())), "info");
        let mut entries = valid();
        entries.push(("logging", "level", " DEBUG "));
        assert_eq!(log_level(&MapConfig::new(&entries)), "debug");
    }
}
