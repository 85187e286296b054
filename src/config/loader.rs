//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading import
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{ImportConfig, ImportConfigFile};

/// Name of the configuration file inside a configuration directory.
pub const CONFIG_FILE_NAME: &str = "import.yaml";

/// Loads and provides access to import configuration.
///
/// # Directory Structure
///
/// ```text
/// config/payroll/
/// └── import.yaml    # Header settings, extra labels, markers, preview size
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll")?;
/// println!("Preview size: {}", loader.config().preview_limit);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: ImportConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns `ConfigNotFound` if `import.yaml` is missing and
    /// `ConfigParseError` if it is not valid YAML for [`ImportConfigFile`].
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let file_path = path.as_ref().join(CONFIG_FILE_NAME);
        let file = Self::load_yaml::<ImportConfigFile>(&file_path)?;

        Ok(Self {
            config: file.into(),
        })
    }

    /// Uses the built-in configuration without reading any file.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the effective import configuration.
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> ImportConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogicalField;
    use std::path::PathBuf;

    fn config_path() -> &'static str {
        "./config/payroll"
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "payroll-engine-{}-{}",
            name,
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_shipped_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.config().preview_limit, 10);
        assert_eq!(loader.config().header.threshold(), 2);
        assert!(
            loader
                .config()
                .labels
                .variants(LogicalField::EmployeeNo)
                .contains(&"sicil no".to_string())
        );
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("import.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_invalid_yaml_returns_parse_error() {
        let dir = scratch_dir("invalid");
        fs::write(dir.join(CONFIG_FILE_NAME), "header: [unclosed").unwrap();

        let result = ConfigLoader::load(&dir);
        match result {
            Err(EngineError::ConfigParseError { path, message }) => {
                assert!(path.contains("import.yaml"));
                assert!(!message.is_empty());
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_unknown_field_label_is_a_parse_error() {
        let dir = scratch_dir("unknown-field");
        fs::write(
            dir.join(CONFIG_FILE_NAME),
            "labels:\n  bonus_allowance: [\"prim\"]\n",
        )
        .unwrap();

        assert!(matches!(
            ConfigLoader::load(&dir),
            Err(EngineError::ConfigParseError { .. })
        ));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_builtin_matches_default_config() {
        let loader = ConfigLoader::builtin();
        assert_eq!(loader.config(), &crate::config::ImportConfig::default());
    }
}
