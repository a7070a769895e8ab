//! Relay configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no
//! file at all) yields a working configuration.

use std::path::{Path, PathBuf};

use relay_dispatch::{DispatchPolicy, DEFAULT_ATTEMPTS, DEFAULT_INTERVAL_MS};
use relay_envelope::MAX_TIMEOUT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Subwallet the signing key addresses.
    pub subwallet_id: u32,
    /// Replay window written into the wallet's initial storage, seconds.
    pub wallet_timeout_secs: u32,
    /// Timeout stamped into each envelope, seconds.
    pub send_timeout_secs: u32,
    /// How far in the past `created_at` is stamped, seconds.
    pub created_at_skew_secs: u32,
    pub dispatch: DispatchSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub attempts: u32,
    pub interval_ms: u64,
    pub verbose: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            subwallet_id: 0,
            wallet_timeout_secs: 60,
            send_timeout_secs: 128,
            created_at_skew_secs: 30,
            dispatch: DispatchSettings::default(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            interval_ms: DEFAULT_INTERVAL_MS,
            verbose: false,
        }
    }
}

impl RelayConfig {
    /// Load from `path`. A missing path or missing file gives defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RelayConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.attempts == 0 {
            return Err(ConfigError::Invalid("dispatch.attempts must be at least 1".into()));
        }
        for (name, value) in [
            ("send_timeout_secs", self.send_timeout_secs),
            ("wallet_timeout_secs", self.wallet_timeout_secs),
        ] {
            if value == 0 || value > MAX_TIMEOUT {
                return Err(ConfigError::Invalid(format!(
                    "{} = {} outside 1..={}",
                    name, value, MAX_TIMEOUT
                )));
            }
        }
        Ok(())
    }

    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy::new(self.dispatch.attempts, self.dispatch.interval_ms)
            .verbose(self.dispatch.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.subwallet_id, 0);
        assert_eq!(config.wallet_timeout_secs, 60);
        assert_eq!(config.send_timeout_secs, 128);
        assert_eq!(config.created_at_skew_secs, 30);
        assert_eq!(config.dispatch.attempts, 10);
        assert_eq!(config.dispatch.interval_ms, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_config() {
        let config = RelayConfig::load(Some(Path::new("/nonexistent/path/relay.toml"))).unwrap();
        assert_eq!(config, RelayConfig::default());
        assert_eq!(RelayConfig::load(None).unwrap(), RelayConfig::default());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RelayConfig::from_toml_str(
            r#"
            subwallet_id = 7

            [dispatch]
            attempts = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.subwallet_id, 7);
        assert_eq!(config.dispatch.attempts, 3);
        assert_eq!(config.dispatch.interval_ms, 5000);
        assert_eq!(config.send_timeout_secs, 128);
    }

    #[test]
    fn rejects_zero_attempts() {
        let err = RelayConfig::from_toml_str("[dispatch]\nattempts = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        let err = RelayConfig::from_toml_str("send_timeout_secs = 4194304\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = RelayConfig::from_toml_str("wallet_timeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            RelayConfig::from_toml_str("subwallet_id = \"x\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn policy_mirrors_settings() {
        let mut config = RelayConfig::default();
        config.dispatch.verbose = true;
        let policy = config.dispatch_policy();
        assert_eq!(policy.attempts, 10);
        assert_eq!(policy.interval_ms, 5000);
        assert!(policy.verbose);
    }
}
