use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::sentinel::SentinelParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("`gateways` must list at least 2 labels, found {found}")]
    TooFewGateways { found: usize },

    #[error("duplicate gateway label: {label}")]
    DuplicateGateway { label: String },

    #[error("cb.failure_threshold must be in (0, 1], got {value}")]
    InvalidFailureThreshold { value: f64 },

    #[error("cb.recovery_timeout must be > 0 seconds, got {value}")]
    InvalidRecoveryTimeout { value: u64 },

    #[error("cb.window_size must be >= 1, got 0")]
    InvalidWindowSize,

    #[error("max_attempts must be >= 1, got 0")]
    InvalidMaxAttempts,
}

/// On-disk representation of `payments.toml`, deserialized before validation.
#[derive(Debug, Deserialize)]
struct RawConfig {
    gateways: Vec<String>,
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,
    #[serde(default)]
    cb: RawCircuitBreakerConfig,
    rng_seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawCircuitBreakerConfig {
    #[serde(default = "default_failure_threshold")]
    failure_threshold: f64,
    #[serde(default = "default_recovery_timeout_secs")]
    recovery_timeout_secs: u64,
    #[serde(default = "default_window_size")]
    window_size: usize,
}

impl Default for RawCircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            recovery_timeout_secs: default_recovery_timeout_secs(),
            window_size: default_window_size(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_failure_threshold() -> f64 {
    0.5
}
fn default_recovery_timeout_secs() -> u64 {
    30
}
fn default_window_size() -> usize {
    10
}

/// Validated, immutable startup configuration for the engine (`spec.md` §6).
#[derive(Debug, Clone)]
pub struct PayCoreConfig {
    pub gateways: Vec<String>,
    pub max_attempts: u32,
    pub sentinel_params: SentinelParams,
    pub rng_seed: Option<u64>,
}

impl PayCoreConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.gateways.len() < 2 {
            return Err(ConfigError::TooFewGateways {
                found: raw.gateways.len(),
            });
        }

        let mut seen = HashSet::with_capacity(raw.gateways.len());
        for label in &raw.gateways {
            if !seen.insert(label) {
                return Err(ConfigError::DuplicateGateway {
                    label: label.clone(),
                });
            }
        }

        if !(raw.cb.failure_threshold > 0.0 && raw.cb.failure_threshold <= 1.0) {
            return Err(ConfigError::InvalidFailureThreshold {
                value: raw.cb.failure_threshold,
            });
        }

        if raw.cb.recovery_timeout_secs == 0 {
            return Err(ConfigError::InvalidRecoveryTimeout {
                value: raw.cb.recovery_timeout_secs,
            });
        }

        if raw.cb.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize);
        }

        if raw.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts);
        }

        Ok(Self {
            gateways: raw.gateways,
            max_attempts: raw.max_attempts,
            sentinel_params: SentinelParams {
                failure_threshold: raw.cb.failure_threshold,
                recovery_timeout: Duration::from_secs(raw.cb.recovery_timeout_secs),
                window_size: raw.cb.window_size,
            },
            rng_seed: raw.rng_seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn loads_a_valid_config() {
        let file = write_config(
            r#"
            gateways = ["stripe", "adyen"]
            max_attempts = 4

            [cb]
            failure_threshold = 0.6
            recovery_timeout_secs = 15
            window_size = 5
            "#,
        );

        let config = PayCoreConfig::from_file(file.path()).expect("config should load");
        assert_eq!(config.gateways, vec!["stripe", "adyen"]);
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.sentinel_params.window_size, 5);
    }

    #[test]
    fn applies_defaults_when_cb_table_is_absent() {
        let file = write_config(r#"gateways = ["a", "b"]"#);
        let config = PayCoreConfig::from_file(file.path()).expect("config should load");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.sentinel_params.failure_threshold, 0.5);
    }

    #[test]
    fn rejects_missing_file() {
        let err = PayCoreConfig::from_file("/nonexistent/payments.toml");
        assert!(matches!(err, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn rejects_malformed_toml() {
        let file = write_config("this is not valid toml {{{");
        let err = PayCoreConfig::from_file(file.path());
        assert!(matches!(err, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn rejects_fewer_than_two_gateways() {
        let file = write_config(r#"gateways = ["solo"]"#);
        let err = PayCoreConfig::from_file(file.path());
        assert!(matches!(err, Err(ConfigError::TooFewGateways { found: 1 })));
    }

    #[test]
    fn rejects_duplicate_gateway_labels() {
        let file = write_config(r#"gateways = ["a", "a"]"#);
        let err = PayCoreConfig::from_file(file.path());
        assert!(matches!(err, Err(ConfigError::DuplicateGateway { .. })));
    }

    #[test]
    fn rejects_out_of_range_failure_threshold() {
        let file = write_config(
            r#"
            gateways = ["a", "b"]
            [cb]
            failure_threshold = 1.5
            "#,
        );
        let err = PayCoreConfig::from_file(file.path());
        assert!(matches!(err, Err(ConfigError::InvalidFailureThreshold { .. })));
    }

    #[test]
    fn rejects_zero_window_size() {
        let file = write_config(
            r#"
            gateways = ["a", "b"]
            [cb]
            window_size = 0
            "#,
        );
        let err = PayCoreConfig::from_file(file.path());
        assert!(matches!(err, Err(ConfigError::InvalidWindowSize)));
    }

    #[test]
    fn rejects_zero_max_attempts() {
        let file = write_config(
            r#"
            gateways = ["a", "b"]
            max_attempts = 0
            "#,
        );
        let err = PayCoreConfig::from_file(file.path());
        assert!(matches!(err, Err(ConfigError::InvalidMaxAttempts)));
    }
}
