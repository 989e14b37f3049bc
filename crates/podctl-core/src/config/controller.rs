//! Controller daemon configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::serde_utils::bound_secs;
use crate::error::ConfigError;

/// Environment variable overriding [`ConnectionConfig::host`]
pub const ENV_HOST: &str = "VCENTER_HOST";
/// Environment variable overriding [`ConnectionConfig::username`]
pub const ENV_USERNAME: &str = "VCENTER_USERNAME";
/// Environment variable overriding [`ConnectionConfig::password`]
pub const ENV_PASSWORD: &str = "VCENTER_PASSWORD";
/// Environment variable overriding [`ConnectionConfig::port`]
pub const ENV_PORT: &str = "VCENTER_PORT";

/// Configuration for the podctl daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Address to bind the HTTP API to
    pub bind_address: String,

    /// Path to the pod inventory (YAML)
    pub inventory_path: PathBuf,

    /// Upper bound on waiting for remote tasks, in seconds (0 = unbounded)
    #[serde(with = "bound_secs")]
    pub task_timeout: Option<Duration>,

    /// Control-plane connection settings
    pub connection: ConnectionConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            inventory_path: PathBuf::from("userdata.yml"),
            task_timeout: Some(Duration::from_secs(600)),
            connection: ConnectionConfig::default(),
        }
    }
}

/// Control-plane endpoint and credentials
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            username: String::new(),
            password: String::new(),
            port: 443,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}

impl ConnectionConfig {
    /// Endpoint as `host:port`
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply `VCENTER_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = password;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.trim().parse().map_err(|_| ConfigError::Environment {
                var: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0:5000");
        assert_eq!(config.task_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.connection.port, 443);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ControllerConfig = toml::from_str(
            r#"
            task_timeout = 0

            [connection]
            host = "vcenter.lab"
            username = "svc"
            "#,
        )
        .unwrap();
        assert_eq!(config.task_timeout, None);
        assert_eq!(config.connection.host, "vcenter.lab");
        assert_eq!(config.connection.port, 443);
        assert_eq!(config.bind_address, "0.0.0.0:5000");
    }

    #[test]
    fn test_env_overrides() {
        let mut conn = ConnectionConfig::default();
        conn.apply_overrides(lookup_from(&[
            (ENV_HOST, "10.0.0.5"),
            (ENV_PASSWORD, "hunter2"),
            (ENV_PORT, "8443"),
        ]))
        .unwrap();
        assert_eq!(conn.endpoint(), "10.0.0.5:8443");
        assert_eq!(conn.password, "hunter2");
        assert_eq!(conn.username, "");
    }

    #[test]
    fn test_bad_port_override_rejected() {
        let mut conn = ConnectionConfig::default();
        let err = conn
            .apply_overrides(lookup_from(&[(ENV_PORT, "https")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Environment { .. }));
    }

    #[test]
    fn test_debug_redacts_password() {
        let conn = ConnectionConfig {
            password: "s3cret".into(),
            ..Default::default()
        };
        let text = format!("{:?}", conn);
        assert!(!text.contains("s3cret"));
        assert!(text.contains("redacted"));
    }
}
