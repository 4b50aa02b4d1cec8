//! INI file configuration adapter.

use crate::domain::error::StockcastError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockcastError> {
        let mut config = Ini::new();
        config
            .load(path.as_ref())
            .map_err(|reason| StockcastError::ConfigParse {
                file: path.as_ref().display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, String> {
        match self.config.get(section, key) {
            None => Ok(None),
            Some(raw) => Self::parse_bool(&raw).map(Some).ok_or(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_sections() {
        let content = r#"
[data]
dir = /srv/quotes
assets = 000001, 600519

[window]
lag_depth = 5

[strategy]
kind = kdj_rsi
rsi_oversold = 25.5
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("data", "dir"),
            Some("/srv/quotes".to_string())
        );
        assert_eq!(adapter.get_string("window", "lag_depth"), Some("5".to_string()));
        assert_eq!(
            adapter.get_string("strategy", "rsi_oversold"),
            Some("25.5".to_string())
        );
    }

    #[test]
    fn get_list_splits_and_trims() {
        let adapter =
            FileConfigAdapter::from_string("[data]\nassets = 000001, 600519,,000002 \n").unwrap();
        assert_eq!(
            adapter.get_list("data", "assets"),
            Some(vec![
                "000001".to_string(),
                "600519".to_string(),
                "000002".to_string()
            ])
        );
        assert_eq!(adapter.get_list("data", "fields"), None);
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string("[window]\n").unwrap();
        assert_eq!(adapter.get_string("window", "target_field"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_bool("strategy", "allow_short"), Ok(None));
    }

    #[test]
    fn get_bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[strategy]\na = true\nb = yes\nc = 1\nd = Off\ne = no\nf = maybe\n",
        )
        .unwrap();
        assert_eq!(adapter.get_bool("strategy", "a"), Ok(Some(true)));
        assert_eq!(adapter.get_bool("strategy", "b"), Ok(Some(true)));
        assert_eq!(adapter.get_bool("strategy", "c"), Ok(Some(true)));
        assert_eq!(adapter.get_bool("strategy", "d"), Ok(Some(false)));
        assert_eq!(adapter.get_bool("strategy", "e"), Ok(Some(false)));
        assert_eq!(adapter.get_bool("strategy", "f"), Err("maybe".to_string()));
        assert_eq!(adapter.get_bool("strategy", "missing"), Ok(None));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[split]\ntrain_start = 2020-01-01\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("split", "train_start"),
            Some("2020-01-01".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, StockcastError::ConfigParse { ref file, .. } if file.contains("config.ini")));
        assert_eq!(err.status(), 2);
    }
}
