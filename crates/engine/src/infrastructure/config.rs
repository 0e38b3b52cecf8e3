//! Engine configuration from environment variables.

use std::str::FromStr;
use std::time::Duration;

use solterra_domain::DEFAULT_BACKGROUND_THRESHOLD;

use super::messages_api::{DEFAULT_API_URL, DEFAULT_MODEL};

pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_SAVE_DB: &str = "solterra.db";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Absent means the narrative generator is unavailable.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub save_db: String,
    pub background_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            save_db: DEFAULT_SAVE_DB.to_string(),
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Read `SOLTERRA_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable numbers keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            api_key: text("SOLTERRA_API_KEY"),
            api_url: text("SOLTERRA_API_URL").unwrap_or(defaults.api_url),
            model: text("SOLTERRA_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_or(&lookup, "SOLTERRA_MAX_TOKENS", defaults.max_tokens),
            temperature: parse_or(&lookup, "SOLTERRA_TEMPERATURE", defaults.temperature),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "SOLTERRA_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "SOLTERRA_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )),
            save_db: text("SOLTERRA_SAVE_DB").unwrap_or(defaults.save_db),
            background_threshold: parse_or(
                &lookup,
                "SOLTERRA_BACKGROUND_THRESHOLD",
                defaults.background_threshold,
            ),
        }
    }

    pub fn generator_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, default = %default, "Unparseable config value, using default");
                default
            }
        },
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
    fn empty_environment_gives_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[]));
        assert_eq!(config, EngineConfig::default());
        assert!(!config.generator_configured());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.background_threshold, 3);
    }

    #[test]
    fn values_are_read_and_bad_numbers_fall_back() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("SOLTERRA_API_KEY", "sk-test"),
            ("SOLTERRA_TIMEOUT_SECS", "5"),
            ("SOLTERRA_MAX_TOKENS", "lots"),
            ("SOLTERRA_SAVE_DB", "/tmp/save.db"),
        ]));
        assert!(config.generator_configured());
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.save_db, "/tmp/save.db");
    }

    #[test]
    fn blank_api_key_means_unconfigured() {
        let config = EngineConfig::from_lookup(lookup(&[("SOLTERRA_API_KEY", "  ")]));
        assert!(config.api_key.is_none());
    }
}
