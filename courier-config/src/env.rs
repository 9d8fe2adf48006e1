// Environment variable overrides

use crate::{ConfigError, CourierConfig, Result};
use std::collections::HashMap;
use std::env;

/// Default prefix for Courier environment variables
pub const DEFAULT_PREFIX: &str = "COURIER";

/// Applies `PREFIX_*` environment variables on top of a loaded config.
///
/// Recognised keys (shown with the default prefix):
///
/// - `COURIER_QUEUE_CAPACITY` - a positive number, or `unbounded`
/// - `COURIER_CONTINUE_ON_ERROR` - `true`/`false`/`1`/`0`
/// - `COURIER_LOG_LEVEL`, `COURIER_LOG_FORMAT`, `COURIER_LOG_FILTER`
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Collect variables carrying the prefix, keyed by lowercased suffix
    pub fn load(&self) -> HashMap<String, String> {
        self.collect(env::vars())
    }

    /// Apply overrides from the process environment
    pub fn apply(&self, config: &mut CourierConfig) -> Result<()> {
        self.apply_vars(config, env::vars())
    }

    /// Apply overrides from an explicit set of variables
    pub fn apply_vars<I>(&self, config: &mut CourierConfig, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars = self.collect(vars);

        if let Some(value) = vars.get("queue_capacity") {
            config.queue.capacity = self.parse_capacity("QUEUE_CAPACITY", value)?;
        }
        if let Some(value) = vars.get("continue_on_error") {
            config.queue.continue_on_error = self.parse_bool("CONTINUE_ON_ERROR", value)?;
        }
        if let Some(value) = vars.get("log_level") {
            config.logging.level = value.clone();
        }
        if let Some(value) = vars.get("log_format") {
            config.logging.format = value.clone();
        }
        if let Some(value) = vars.get("log_filter") {
            config.logging.filter = Some(value.clone()).filter(|f| !f.is_empty());
        }

        Ok(())
    }

    fn collect<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{}_", self.prefix);
        vars.into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|suffix| (suffix.to_lowercase(), value))
            })
            .collect()
    }

    fn parse_capacity(&self, key: &str, value: &str) -> Result<Option<usize>> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unbounded") {
            return Ok(None);
        }
        trimmed
            .parse::<usize>()
            .map(Some)
            .map_err(|_| self.invalid(key, value))
    }

    fn parse_bool(&self, key: &str, value: &str) -> Result<bool> {
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(self.invalid(key, value)),
        }
    }

    fn invalid(&self, key: &str, value: &str) -> ConfigError {
        ConfigError::InvalidEnvValue {
            key: format!("{}_{}", self.prefix, key),
            value: value.to_string(),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_overrides_are_applied() {
        let mut config = CourierConfig::default();
        EnvLoader::default()
            .apply_vars(
                &mut config,
                vars(&[
                    ("COURIER_QUEUE_CAPACITY", "128"),
                    ("COURIER_CONTINUE_ON_ERROR", "false"),
                    ("COURIER_LOG_LEVEL", "debug"),
                    ("COURIER_LOG_FORMAT", "pretty"),
                ]),
            )
            .unwrap();

        assert_eq!(config.queue.capacity, Some(128));
        assert!(!config.queue.continue_on_error);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_unprefixed_vars_are_ignored() {
        let mut config = CourierConfig::default();
        EnvLoader::default()
            .apply_vars(&mut config, vars(&[("QUEUE_CAPACITY", "8"), ("LOG_LEVEL", "trace")]))
            .unwrap();

        assert_eq!(config, CourierConfig::default());
    }

    #[test]
    fn test_unbounded_capacity() {
        let mut config = CourierConfig::default();
        config.queue.capacity = Some(10);

        EnvLoader::default()
            .apply_vars(&mut config, vars(&[("COURIER_QUEUE_CAPACITY", "unbounded")]))
            .unwrap();
        assert_eq!(config.queue.capacity, None);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let mut config = CourierConfig::default();
        let err = EnvLoader::new("APP")
            .apply_vars(&mut config, vars(&[("APP_CONTINUE_ON_ERROR", "maybe")]))
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid value for APP_CONTINUE_ON_ERROR: maybe");
    }

    #[test]
    fn test_load_missing_prefix_is_empty() {
        let loader = EnvLoader::new("COURIER_TEST_NONEXISTENT_12345");
        assert!(loader.load().is_empty());
    }
}
