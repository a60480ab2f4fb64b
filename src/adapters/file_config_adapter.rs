//! INI file configuration adapter.

use crate::domain::error::PricecastError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PricecastError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| PricecastError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, PricecastError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| PricecastError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn sections(&self) -> Vec<String> {
        self.config.sections()
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
    fn from_string_parses_config() {
        let content = r#"
[model]
kind = Random Forest
horizon = 5

[trading]
initial_capital = 2500
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("model", "kind"),
            Some("Random Forest".to_string())
        );
        assert_eq!(adapter.get_string("model", "horizon"), Some("5".to_string()));
        assert_eq!(
            adapter.get_string("trading", "initial_capital"),
            Some("2500".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[model]\nhorizon = 7\n").unwrap();
        assert_eq!(adapter.get_string("model", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn keys_and_sections_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Model]\nHorizon = 3\n").unwrap();
        assert_eq!(adapter.get_string("model", "horizon"), Some("3".to_string()));
    }

    #[test]
    fn sections_listed() {
        let adapter =
            FileConfigAdapter::from_string("[model]\nhorizon = 3\n[forest]\nseed = 1\n").unwrap();
        let mut sections = adapter.sections();
        sections.sort();
        assert_eq!(sections, vec!["forest".to_string(), "model".to_string()]);
        assert!(adapter.has_section("forest"));
        assert!(!adapter.has_section("trading"));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[features]\nenabled = rsi, macd\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("features", "enabled"),
            Some("rsi, macd".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(
            err,
            PricecastError::ConfigParse { file, .. } if file.contains("config.ini")
        ));
    }
}
