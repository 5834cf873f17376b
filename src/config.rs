//! Configuration loading.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. YAML config file (`--config`, else `$XDG_CONFIG_HOME/knowtree/knowtree.yml` if present)
//! 3. Command-line overrides applied by the caller

use crate::export::ExportFormat;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory name under the platform data/config dirs.
const APP_DIR: &str = "knowtree";

/// Config file name.
const CONFIG_FILE: &str = "knowtree.yml";

/// Database file name.
const DB_FILE: &str = "knowledge.db";

/// Log file name, kept in a `logs` dir next to the database.
const LOG_FILE: &str = "knowtree.log";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database
    pub database: PathBuf,

    /// Layout used by `export` when none is given
    pub export_format: ExportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            export_format: ExportFormat::default(),
        }
    }
}

impl Config {
    /// Load from an explicit file, or from the default location when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a YAML config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Replace the database path if an override is given.
    pub fn with_database(mut self, database: Option<PathBuf>) -> Self {
        if let Some(database) = database {
            self.database = database;
        }
        self
    }
}

/// Default database location: `$XDG_DATA_HOME/knowtree/knowledge.db`.
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(DB_FILE)
}

/// Default log file location: `$XDG_DATA_HOME/knowtree/logs/knowtree.log`.
pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs")
        .join(LOG_FILE)
}

/// Default config file location, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_database_name() {
        let config = Config::default();
        assert!(config.database.ends_with("knowtree/knowledge.db"));
        assert_eq!(config.export_format, ExportFormat::Report);
    }

    #[test]
    fn test_log_and_database_share_app_dir() {
        let log = default_log_path();
        assert!(log.ends_with("knowtree/logs/knowtree.log"));
        assert_eq!(log.parent().and_then(|p| p.parent()), default_database_path().parent());
    }

    #[test]
    fn test_from_file_partial() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("knowtree.yml");
        fs::write(&path, "export_format: outline\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.export_format, ExportFormat::Outline);
        assert_eq!(config.database, default_database_path());
    }

    #[test]
    fn test_from_file_full() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("knowtree.yml");
        fs::write(&path, "database: /tmp/kt/test.db\nexport_format: report\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/kt/test.db"));
    }

    #[test]
    fn test_from_file_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("knowtree.yml");
        fs::write(&path, "export_format: [not, a, format]\n").unwrap();

        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp_dir.path().join("absent.yml"))).is_err());
    }

    #[test]
    fn test_database_override() {
        let config = Config::default().with_database(Some(PathBuf::from("other.db")));
        assert_eq!(config.database, PathBuf::from("other.db"));

        let config = Config::default().with_database(None);
        assert_eq!(config.database, default_database_path());
    }
}
