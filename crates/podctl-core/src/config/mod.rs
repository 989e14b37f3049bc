//! Configuration management for podctl

mod controller;
mod inventory;
pub mod serde_utils;

pub use controller::{
    ConnectionConfig, ControllerConfig, ENV_HOST, ENV_PASSWORD, ENV_PORT, ENV_USERNAME,
};
pub use inventory::{load_inventory, Inventory, Pod, PortGroupOption, VmEntry};

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("podctl")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a TOML file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_load_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "task_timeout = 30\n\n[connection]\nhost = \"vc.example\"\n",
        )
        .unwrap();

        let loaded: ControllerConfig = load_config(&path).unwrap();
        assert_eq!(loaded.task_timeout, Some(Duration::from_secs(30)));
        assert_eq!(loaded.connection.host, "vc.example");
        assert_eq!(loaded.connection.port, 443);
        assert_eq!(loaded.bind_address, "0.0.0.0:5000");
    }

    #[test]
    fn test_zero_timeout_is_unbounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "task_timeout = 0\n").unwrap();

        let loaded: ControllerConfig = load_config(&path).unwrap();
        assert_eq!(loaded.task_timeout, None);
    }

    #[test]
    fn test_malformed_config_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "task_timeout = \"soon\"\n").unwrap();

        let result: Result<ControllerConfig, _> = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<ControllerConfig, _> = load_config(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_default_path_is_under_podctl() {
        assert!(default_config_path().ends_with("podctl/config.toml"));
    }
}
