//! Configuration file for the CLI
//!
//! Optional TOML at `$XDG_CONFIG_HOME/keybard/config.toml`. A missing file
//! yields the defaults; a malformed one is an error.
//!
//! ```toml
//! log_level = "debug"
//! device = "/dev/hidraw4"
//!
//! [[filters]]
//! usage_page = 0xFF60
//! usage = 0x61
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vial_transport::DeviceFilter;

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default tracing directive when `RUST_LOG` is unset
    pub log_level: String,
    /// Extra usage page/usage pairs accepted besides the VIA interface
    pub filters: Vec<DeviceFilter>,
    /// Device path to open when several keyboards are attached
    pub device: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            filters: Vec::new(),
            device: None,
        }
    }
}

impl Config {
    /// Default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keybard")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Filters to match devices against: the VIA interface first, then extras
    pub fn device_filters(&self) -> Vec<DeviceFilter> {
        let mut filters = vec![DeviceFilter::default()];
        for filter in &self.filters {
            if !filters.contains(filter) {
                filters.push(*filter);
            }
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.device_filters(), vec![DeviceFilter::default()]);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            log_level: "debug".into(),
            filters: vec![DeviceFilter::new(0xFF60, 0x62)],
            device: Some("/dev/hidraw4".into()),
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "device = \"/dev/hidraw1\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.device.as_deref(), Some("/dev/hidraw1"));
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "filters = 3").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn duplicate_filters_collapse() {
        let config = Config {
            filters: vec![DeviceFilter::default(), DeviceFilter::new(1, 2)],
            ..Default::default()
        };
        assert_eq!(
            config.device_filters(),
            vec![DeviceFilter::default(), DeviceFilter::new(1, 2)]
        );
    }
}
