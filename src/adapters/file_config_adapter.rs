//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive. A key written without a value
//! reads as missing.

use crate::domain::error::StockfolioError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::collections::HashMap;
use std::path::Path;

type Sections = HashMap<String, HashMap<String, Option<String>>>;

#[derive(Debug)]
pub struct FileConfigAdapter {
    sections: Sections,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockfolioError> {
        let path = path.as_ref();
        Ini::new()
            .load(path)
            .map(|sections| Self { sections })
            .map_err(|reason| StockfolioError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })
    }

    pub fn from_string(content: &str) -> Result<Self, StockfolioError> {
        Ini::new()
            .read(content.to_string())
            .map(|sections| Self { sections })
            .map_err(|reason| StockfolioError::ConfigParse {
                file: "<inline>".into(),
                reason,
            })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.sections
            .get(&section.to_lowercase())?
            .get(&key.to_lowercase())?
            .clone()
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get_string(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[sqlite]
path = /var/lib/stockfolio/ledger.db
pool_size = 8

[market_data]
path = /var/lib/stockfolio/history

[logging]
level = debug
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("/var/lib/stockfolio/ledger.db".to_string())
        );
        assert_eq!(adapter.get_string("logging", "level"), Some("debug".to_string()));
    }

    #[test]
    fn lookups_ignore_case() {
        let adapter = FileConfigAdapter::from_string("[SQLite]\nPool_Size = 3\n").unwrap();
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 3);
        assert_eq!(adapter.get_int("SQLITE", "POOL_SIZE", 4), 3);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("sqlite", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 8);
        assert_eq!(adapter.get_int("sqlite", "missing", 4), 4);

        let adapter = FileConfigAdapter::from_string("[sqlite]\npool_size = many\n").unwrap();
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 4);
    }

    #[test]
    fn get_path_trims_and_skips_blank() {
        let adapter =
            FileConfigAdapter::from_string("[market_data]\npath =   /data/history  \nempty =\n")
                .unwrap();
        assert_eq!(
            adapter.get_path("market_data", "path"),
            Some(PathBuf::from("/data/history"))
        );
        assert_eq!(adapter.get_path("market_data", "empty"), None);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("market_data", "path"),
            Some("/var/lib/stockfolio/history".to_string())
        );
    }

    #[test]
    fn missing_file_is_a_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/stockfolio.ini").unwrap_err();
        assert!(
            matches!(err, StockfolioError::ConfigParse { ref file, .. } if file.ends_with("stockfolio.ini"))
        );
    }
}
