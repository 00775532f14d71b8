//! Configuration for backoff engines.

use crate::context::Context;
use crate::retry::{Backoff, DEFAULT_INTERVAL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the base interval in milliseconds.
pub const ENV_INTERVAL_MS: &str = "FIBRETRY_INTERVAL_MS";

/// Environment variable holding the attempt ceiling.
pub const ENV_MAX_ATTEMPT: &str = "FIBRETRY_MAX_ATTEMPT";

/// Errors raised while loading a [`BackoffConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable is set but cannot be parsed.
    #[error("{var} must be a non-negative integer, got: '{value}'")]
    InvalidValue {
        /// Name of the offending variable.
        var: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
}

/// Settings applied to a [`Backoff`] at construction.
///
/// Deserialises from `interval_ms` and `max_attempt`, both optional:
///
/// ```rust
/// use fibretry::BackoffConfig;
/// use std::time::Duration;
///
/// let config: BackoffConfig = toml::from_str("interval_ms = 200").unwrap();
/// assert_eq!(config.interval, Duration::from_millis(200));
/// assert_eq!(config.max_attempt, 0);
/// ```
///
/// A zero interval is ignored when applied, keeping the engine's current one.
/// A zero ceiling means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Base unit multiplied by the Fibonacci term.
    #[serde(rename = "interval_ms", with = "millis")]
    pub interval: Duration,

    /// Attempt ceiling, `0` for unbounded.
    pub max_attempt: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_attempt: 0,
        }
    }
}

impl BackoffConfig {
    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `FIBRETRY_INTERVAL_MS` for the base interval in milliseconds
    /// - `FIBRETRY_MAX_ATTEMPT` for the attempt ceiling
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but is not
    /// a valid non-negative integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = read_var::<u64>(ENV_INTERVAL_MS)? {
            config.interval = Duration::from_millis(ms);
        }

        if let Some(max_attempt) = read_var::<u32>(ENV_MAX_ATTEMPT)? {
            config.max_attempt = max_attempt;
        }

        Ok(config)
    }

    /// Build an engine scoped to `ctx` with these settings.
    pub fn build(&self, ctx: Option<&Context>) -> Backoff {
        Backoff::from_config(ctx, self)
    }
}

fn read_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        Err(_) => Ok(None),
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
