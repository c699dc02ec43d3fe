//! Application settings and paths.
//!
//! Manages XDG-compliant paths for the settings file and the service store.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use crate::types::{Port, PortRange};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/porthole)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/porthole)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Locate the per-user directories. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "porthole", "porthole").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the default path of the service store.
    pub fn services_file(&self) -> PathBuf {
        self.data_dir.join("services.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Concurrent connection attempts, 0 for no limit.
    pub concurrency: usize,
    /// Per-port connection timeout in milliseconds.
    pub timeout_ms: u64,
    /// First port of the scan range.
    pub start_port: u16,
    /// Last port of the scan range.
    pub end_port: u16,
    /// Service store location, overriding the data directory default.
    pub services_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            start_port: Port::MIN,
            end_port: Port::MAX,
            services_path: None,
        }
    }
}

impl AppSettings {
    /// Load settings.
    ///
    /// An explicit `path` must exist. Without one, the default settings file
    /// is used if present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>, paths: Option<&Paths>) -> ConfigResult<Self> {
        match (path, paths) {
            (Some(path), _) => Self::load_from(path),
            (None, Some(paths)) => {
                let file = paths.settings_file();
                if file.is_file() {
                    Self::load_from(&file)
                } else {
                    Ok(Self::default())
                }
            }
            (None, None) => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// The configured scan range, validated.
    pub fn port_range(&self) -> ConfigResult<PortRange> {
        Ok(PortRange::from_bounds(self.start_port, self.end_port)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.concurrency, 500);
        assert_eq!(settings.timeout(), Duration::from_secs(3));
        assert_eq!(settings.port_range().unwrap(), PortRange::full());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "timeout_ms": 250, "end_port": 1024 }"#).unwrap();

        let settings = AppSettings::load(Some(&path), None).unwrap();
        assert_eq!(settings.timeout_ms, 250);
        assert_eq!(settings.end_port, 1024);
        assert_eq!(settings.start_port, 1);
        assert_eq!(settings.concurrency, 500);
    }

    #[test]
    fn test_missing_default_file_is_fine() {
        let dir = TempDir::new().unwrap();
        let paths = Paths {
            config_dir: dir.path().to_path_buf(),
            data_dir: dir.path().to_path_buf(),
        };
        assert_eq!(
            AppSettings::load(None, Some(&paths)).unwrap(),
            AppSettings::default()
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.json");
        assert!(matches!(
            AppSettings::load(Some(&path), None),
            Err(ConfigError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_invalid_range_rejected() {
        let settings = AppSettings {
            start_port: 100,
            end_port: 10,
            ..Default::default()
        };
        assert!(settings.port_range().is_err());

        let settings = AppSettings {
            start_port: 0,
            ..Default::default()
        };
        assert!(settings.port_range().is_err());
    }
}
