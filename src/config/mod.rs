use serde::Deserialize;
use std::env;
use thiserror::Error;

/// Environment variable toggling OS signal handling
pub const ENV_HANDLE_SIGNALS: &str = "LIFECYCLE_HANDLE_SIGNALS";
/// Environment variable overriding the fatal exit code
pub const ENV_EXIT_CODE: &str = "LIFECYCLE_EXIT_CODE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid lifecycle configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Application settings
///
/// - `handle_signals`: listen for `SIGTERM`/`SIGINT` and shut down on either (default `true`)
/// - `exit_code`: process exit code used when terminating with an error (default `1`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub handle_signals: bool,
    pub exit_code: i32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            handle_signals: true,
            exit_code: 1,
        }
    }
}

impl LifecycleConfig {
    /// Load from `LIFECYCLE_*` environment variables; unset ones keep their defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key lookup (an env snapshot, a CLI layer, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_HANDLE_SIGNALS) {
            config.handle_signals = parse_bool(&value).ok_or(ConfigError::InvalidValue {
                key: ENV_HANDLE_SIGNALS,
                value,
            })?;
        }

        if let Some(value) = lookup(ENV_EXIT_CODE) {
            config.exit_code = value
                .trim()
                .parse::<i32>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_EXIT_CODE,
                    value: value.clone(),
                })?;
        }

        config.validate(ENV_EXIT_CODE)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate("exit_code")
    }

    /// A zero exit code would report a fatal error as success
    fn validate(self, exit_code_key: &'static str) -> Result<Self, ConfigError> {
        if self.exit_code == 0 {
            return Err(ConfigError::InvalidValue {
                key: exit_code_key,
                value: self.exit_code.to_string(),
            });
        }
        Ok(self)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = LifecycleConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, LifecycleConfig::default());
        assert!(config.handle_signals);
        assert_eq!(config.exit_code, 1);
    }

    #[test]
    fn reads_overrides() {
        let config = LifecycleConfig::from_lookup(lookup(&[
            (ENV_HANDLE_SIGNALS, "off"),
            (ENV_EXIT_CODE, "3"),
        ]))
        .unwrap();
        assert!(!config.handle_signals);
        assert_eq!(config.exit_code, 3);
    }

    #[test]
    fn rejects_bad_values() {
        let err = LifecycleConfig::from_lookup(lookup(&[(ENV_HANDLE_SIGNALS, "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_HANDLE_SIGNALS));

        // a zero exit code would hide failures
        assert!(LifecycleConfig::from_lookup(lookup(&[(ENV_EXIT_CODE, "0")])).is_err());
    }

    #[test]
    fn parses_json_with_defaults() {
        let config = LifecycleConfig::from_json(r#"{ "exit_code": 70 }"#).unwrap();
        assert!(config.handle_signals);
        assert_eq!(config.exit_code, 70);

        assert!(LifecycleConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn json_rejects_zero_exit_code() {
        let err = LifecycleConfig::from_json(r#"{ "exit_code": 0 }"#).unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value } => {
                assert_eq!(key, "exit_code");
                assert_eq!(value, "0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
