//! Dashboard Configuration
//! Optional JSON settings file; every field falls back to the built-in default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE_NAME: &str = "churn_dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("test_size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),
}

/// Paths and model settings shared by every section handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub raw_data_path: PathBuf,
    pub clean_data_path: PathBuf,
    pub test_size: f64,
    pub random_state: u64,
    pub n_estimators: usize,
    pub max_iter: usize,
    pub histogram_bins: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            raw_data_path: PathBuf::from("Telco_Customer_Churn.csv"),
            clean_data_path: PathBuf::from("clean_churn.csv"),
            test_size: 0.3,
            random_state: 42,
            n_estimators: 100,
            max_iter: 1000,
            histogram_bins: 30,
        }
    }
}

impl AppConfig {
    /// Load settings from `path`, or defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigError::InvalidTestSize(self.test_size));
        }
        Ok(())
    }

    /// File name of the cleaned dataset, used in status messages.
    pub fn clean_file_name(&self) -> String {
        self.clean_data_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.clean_data_path.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_gives_defaults() {
        let config = AppConfig::load_or_default(Path::new("definitely/not/here.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.clean_file_name(), "clean_churn.csv");
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "n_estimators": 10, "random_state": 7 }}"#).unwrap();

        let config = AppConfig::load_or_default(file.path()).unwrap();
        assert_eq!(config.n_estimators, 10);
        assert_eq!(config.random_state, 7);
        assert_eq!(config.test_size, 0.3);
        assert_eq!(config.raw_data_path, PathBuf::from("Telco_Customer_Churn.csv"));
    }

    #[test]
    fn rejects_out_of_range_test_size() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "test_size": 1.5 }}"#).unwrap();

        let err = AppConfig::load_or_default(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTestSize(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();

        assert!(matches!(
            AppConfig::load_or_default(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
