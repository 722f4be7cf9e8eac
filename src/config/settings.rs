//! Application settings and paths.
//!
//! Settings are stored as JSON in the XDG configuration directory
//! (`~/.config/portsweep/settings.json` on Linux). Every field has a
//! default, so a missing file or a partial file is fine.

use crate::error::{ConfigError, ConfigResult};
use crate::services::ServiceTable;
use crate::types::MAX_HOSTS_PER_TARGET;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portsweep)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve the platform directories for this application.
    pub fn resolve() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "portsweep", "portsweep")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Worker pool size when `--threads` is not given.
    pub default_threads: usize,
    /// Per-connection timeout in seconds when `--timeout` is not given.
    pub default_timeout_secs: u64,
    /// Largest number of addresses a single target may expand to.
    pub max_hosts_per_target: u64,
    /// Reverse-resolve the hostname of each responsive IP.
    pub resolve_hostnames: bool,
    /// Extra or replacement service labels, keyed by port.
    pub services: BTreeMap<u16, String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_threads: 100,
            default_timeout_secs: 2,
            max_hosts_per_target: MAX_HOSTS_PER_TARGET as u64,
            resolve_hostnames: true,
            services: BTreeMap::new(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults
    /// when no file exists.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::resolve()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Build the service table: built-in entries plus configured overrides.
    pub fn service_table(&self) -> ServiceTable {
        ServiceTable::common().with_overrides(
            self.services
                .iter()
                .map(|(port, name)| (*port, name.clone())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Port;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_threads, 100);
        assert_eq!(settings.default_timeout_secs, 2);
        assert!(settings.resolve_hostnames);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "default_threads": 8, "services": { "6379": "Redis" } }"#).unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.default_threads, 8);
        assert_eq!(settings.default_timeout_secs, 2);

        let table = settings.service_table();
        assert_eq!(table.classify(Port::new(6379).unwrap()), "Redis");
        assert_eq!(table.classify(Port::new(22).unwrap()), "SSH");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = AppSettings::default();
        settings.resolve_hostnames = false;
        settings.save_to(&path).unwrap();

        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            AppSettings::load_from(&path),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppSettings::load_from(&dir.path().join("absent.json")),
            Err(ConfigError::ReadFailed { .. })
        ));
    }
}
