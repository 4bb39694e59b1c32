//! Runtime settings read from the environment (and `.env` via dotenv).

use humantime_serde::re::humantime;
use std::env;
use std::num::ParseIntError;
use std::time::Duration;
use thiserror::Error;

use crate::commands::music::utils::queue::DEFAULT_QUEUE_CAPACITY;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing {0} in env")]
    Missing(&'static str),

    #[error("Invalid duration for {key}: `{value}` ({source})")]
    InvalidDuration {
        key: &'static str,
        value: String,
        source: humantime::DurationError,
    },

    #[error("Invalid number for {key}: `{value}` ({source})")]
    InvalidNumber {
        key: &'static str,
        value: String,
        source: ParseIntError,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Clone, PartialEq)]
pub struct Config {
    pub discord_token: String,
    /// How long a guild may stay idle before the bot leaves
    pub idle_timeout: Duration,
    pub idle_sweep_interval: Duration,
    pub max_queue_length: usize,
}

// Keeps the token out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<redacted>")
            .field("idle_timeout", &self.idle_timeout)
            .field("idle_sweep_interval", &self.idle_sweep_interval)
            .field("max_queue_length", &self.max_queue_length)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup, e.g. a map in tests
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = value("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let idle_timeout = match value("IDLE_TIMEOUT") {
            Some(raw) => parse_duration("IDLE_TIMEOUT", raw)?,
            None => DEFAULT_IDLE_TIMEOUT,
        };
        let idle_sweep_interval = match value("IDLE_SWEEP_INTERVAL") {
            Some(raw) => parse_duration("IDLE_SWEEP_INTERVAL", raw)?,
            None => DEFAULT_IDLE_SWEEP_INTERVAL,
        };
        let max_queue_length = match value("MAX_QUEUE_LENGTH") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => return Err(ConfigError::Zero("MAX_QUEUE_LENGTH")),
                Ok(n) => n,
                Err(source) => {
                    return Err(ConfigError::InvalidNumber {
                        key: "MAX_QUEUE_LENGTH",
                        value: raw,
                        source,
                    });
                }
            },
            None => DEFAULT_QUEUE_CAPACITY,
        };

        Ok(Self {
            discord_token,
            idle_timeout,
            idle_sweep_interval,
            max_queue_length,
        })
    }
}

fn parse_duration(key: &'static str, raw: String) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(raw.trim())
        .map_err(|source| ConfigError::InvalidDuration {
            key,
            value: raw.clone(),
            source,
        })?;
    if duration.is_zero() {
        return Err(ConfigError::Zero(key));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use test_case::test_case;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DISCORD_TOKEN", "token")]).unwrap();

        assert_eq!(
            config,
            Config {
                discord_token: "token".to_string(),
                idle_timeout: Duration::from_secs(300),
                idle_sweep_interval: Duration::from_secs(30),
                max_queue_length: 500,
            }
        );
    }

    #[test]
    fn test_missing_token() {
        assert_matches!(config(&[]), Err(ConfigError::Missing("DISCORD_TOKEN")));
        assert_matches!(
            config(&[("DISCORD_TOKEN", "  ")]),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        );
    }

    #[test_case("90s", 90)]
    #[test_case("10m", 600)]
    #[test_case("1h 30m", 5400)]
    fn test_idle_timeout_parses(raw: &str, seconds: u64) {
        let config = config(&[("DISCORD_TOKEN", "t"), ("IDLE_TIMEOUT", raw)]).unwrap();
        assert_eq!(config.idle_timeout, Duration::from_secs(seconds));
    }

    #[test_case("IDLE_TIMEOUT", "soon")]
    #[test_case("IDLE_SWEEP_INTERVAL", "5 parsecs")]
    fn test_malformed_duration(key: &str, raw: &str) {
        assert_matches!(
            config(&[("DISCORD_TOKEN", "t"), (key, raw)]),
            Err(ConfigError::InvalidDuration { value, .. }) if value == raw
        );
    }

    #[test]
    fn test_malformed_queue_length() {
        assert_matches!(
            config(&[("DISCORD_TOKEN", "t"), ("MAX_QUEUE_LENGTH", "lots")]),
            Err(ConfigError::InvalidNumber { key: "MAX_QUEUE_LENGTH", .. })
        );
    }

    #[test_case("IDLE_TIMEOUT", "0s")]
    #[test_case("MAX_QUEUE_LENGTH", "0")]
    fn test_zero_is_rejected(key: &str, raw: &str) {
        assert_matches!(
            config(&[("DISCORD_TOKEN", "t"), (key, raw)]),
            Err(ConfigError::Zero(_))
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let config = config(&[("DISCORD_TOKEN", "secret")]).unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
