//! Registry configuration loaded from the environment.
//!
//! | Variable                      | Default | Meaning                              |
//! |-------------------------------|---------|--------------------------------------|
//! | `DURAK_MATCH_ID_LEN`          | 6       | Length of generated match ids        |
//! | `DURAK_MATCH_ID_FALLBACK_LEN` | 12      | Length used once short ids collide   |
//! | `DURAK_MATCH_ID_ATTEMPTS`     | 16      | Attempts per length before giving up |
//! | `DURAK_SEED`                  | unset   | Base seed for deterministic matches  |

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::errors::ErrorCode;

const MIN_MATCH_ID_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable '{name}' has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("inconsistent registry config: {0}")]
    Inconsistent(String),
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ConfigError
    }
}

/// Settings for [`crate::services::registry::MatchRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub match_id_len: usize,
    pub fallback_match_id_len: usize,
    pub max_id_attempts: u32,
    /// When set, match `n` is seeded with `derive_match_seed(base, n)`.
    pub base_seed: Option<u64>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            match_id_len: 6,
            fallback_match_id_len: 12,
            max_id_attempts: 16,
            base_seed: None,
        }
    }
}

impl RegistryConfig {
    /// Read overrides from the environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            match_id_len: parse_var("DURAK_MATCH_ID_LEN")?.unwrap_or(defaults.match_id_len),
            fallback_match_id_len: parse_var("DURAK_MATCH_ID_FALLBACK_LEN")?
                .unwrap_or(defaults.fallback_match_id_len),
            max_id_attempts: parse_var("DURAK_MATCH_ID_ATTEMPTS")?
                .unwrap_or(defaults.max_id_attempts),
            base_seed: parse_var("DURAK_SEED")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Deterministic config for tests and replays.
    pub fn seeded(base_seed: u64) -> Self {
        Self {
            base_seed: Some(base_seed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.match_id_len < MIN_MATCH_ID_LEN {
            return Err(ConfigError::Inconsistent(format!(
                "match id length {} is below the minimum of {MIN_MATCH_ID_LEN}",
                self.match_id_len
            )));
        }
        if self.fallback_match_id_len < self.match_id_len {
            return Err(ConfigError::Inconsistent(format!(
                "fallback id length {} is shorter than primary length {}",
                self.fallback_match_id_len, self.match_id_len
            )));
        }
        if self.max_id_attempts == 0 {
            return Err(ConfigError::Inconsistent(
                "match id attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse an optional variable. Unset or blank means `None`.
fn parse_var<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        })
}
