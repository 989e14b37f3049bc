//! Shared serde helpers for configuration

/// An optional bound written as whole seconds, where `0` means "no bound".
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Config {
///     #[serde(with = "podctl_core::config::serde_utils::bound_secs")]
///     task_timeout: Option<Duration>,
/// }
/// ```
pub mod bound_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(bound: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(bound.map(|d| d.as_secs()).unwrap_or(0))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok((secs > 0).then(|| Duration::from_secs(secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestConfig {
        #[serde(with = "bound_secs")]
        timeout: Option<Duration>,
    }

    #[test]
    fn test_zero_means_unbounded() {
        let config: TestConfig = serde_json::from_str(r#"{"timeout":0}"#).unwrap();
        assert_eq!(config.timeout, None);
        assert_eq!(serde_json::to_string(&config).unwrap(), r#"{"timeout":0}"#);
    }

    #[test]
    fn test_seconds_become_bound() {
        let config: TestConfig = serde_json::from_str(r#"{"timeout":90}"#).unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(90)));
    }
}
