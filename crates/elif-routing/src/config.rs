//! Router configuration

use crate::error::{RoutingError, RoutingResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default configuration values
pub struct RouterDefaults;

impl RouterDefaults {
    pub const ENABLE_SKIPPABLE_PATHS: bool = true;
    pub const STRICT_CHECK_TRAILING: bool = true;
    pub const CACHE_TTL_SECS: u64 = 300;
    pub const CACHE_CAPACITY: usize = 10_000;
}

/// Routing engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Precompute skippable paths for runs of literal segments
    pub enable_skippable_paths: bool,
    /// Strict trailing slash check for routes registered through a collector
    pub default_strict_check_trailing: bool,
    /// Lifetime of cached match results in seconds
    pub cache_ttl_secs: u64,
    /// Maximum number of cached match results
    pub cache_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enable_skippable_paths: RouterDefaults::ENABLE_SKIPPABLE_PATHS,
            default_strict_check_trailing: RouterDefaults::STRICT_CHECK_TRAILING,
            cache_ttl_secs: RouterDefaults::CACHE_TTL_SECS,
            cache_capacity: RouterDefaults::CACHE_CAPACITY,
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> RoutingResult<()> {
        if self.cache_ttl_secs == 0 {
            return Err(RoutingError::config("Cache TTL must be greater than 0"));
        }

        if self.cache_capacity == 0 {
            return Err(RoutingError::config(
                "Cache capacity must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Load configuration from `ROUTER_*` environment variables, falling back
    /// to [`RouterDefaults`] for unset ones
    pub fn from_env() -> RoutingResult<Self> {
        let enable_skippable_paths = parse_env(
            "ROUTER_ENABLE_SKIPPABLE_PATHS",
            RouterDefaults::ENABLE_SKIPPABLE_PATHS,
            "true or false",
        )?;

        let default_strict_check_trailing = parse_env(
            "ROUTER_STRICT_TRAILING",
            RouterDefaults::STRICT_CHECK_TRAILING,
            "true or false",
        )?;

        let cache_ttl_secs = parse_env(
            "ROUTER_CACHE_TTL",
            RouterDefaults::CACHE_TTL_SECS,
            "valid number of seconds",
        )?;

        let cache_capacity = parse_env(
            "ROUTER_CACHE_CAPACITY",
            RouterDefaults::CACHE_CAPACITY,
            "valid number of entries",
        )?;

        let config = RouterConfig {
            enable_skippable_paths,
            default_strict_check_trailing,
            cache_ttl_secs,
            cache_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Get cache TTL as Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn with_skippable_paths(mut self, enabled: bool) -> Self {
        self.enable_skippable_paths = enabled;
        self
    }

    pub fn with_strict_check_trailing(mut self, strict: bool) -> Self {
        self.default_strict_check_trailing = strict;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

fn parse_env<T: std::str::FromStr + ToString>(
    key: &str,
    default: T,
    expected: &str,
) -> RoutingResult<T> {
    let value = get_env_or_default(key, &default.to_string());
    value.parse::<T>().map_err(|_| {
        RoutingError::config(format!(
            "Invalid value '{}' for {}: expected {}",
            value, key, expected
        ))
    })
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert!(config.enable_skippable_paths);
        assert!(config.default_strict_check_trailing);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.cache_capacity, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = RouterConfig::default().with_cache_capacity(0);
        assert!(matches!(config.validate(), Err(RoutingError::Config { .. })));

        let config = RouterConfig::default().with_cache_ttl(Duration::from_millis(10));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env() {
        env::set_var("ROUTER_ENABLE_SKIPPABLE_PATHS", "false");
        env::set_var("ROUTER_CACHE_CAPACITY", "64");
        let config = RouterConfig::from_env().unwrap();
        assert!(!config.enable_skippable_paths);
        assert_eq!(config.cache_capacity, 64);
        assert_eq!(config.cache_ttl_secs, RouterDefaults::CACHE_TTL_SECS);

        env::set_var("ROUTER_CACHE_TTL", "soon");
        let err = RouterConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("ROUTER_CACHE_TTL"));

        env::remove_var("ROUTER_ENABLE_SKIPPABLE_PATHS");
        env::remove_var("ROUTER_CACHE_CAPACITY");
        env::remove_var("ROUTER_CACHE_TTL");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RouterConfig =
            serde_yaml::from_str("enable_skippable_paths: false\ncache_ttl_secs: 60\n").unwrap();
        assert!(!config.enable_skippable_paths);
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.cache_capacity, RouterDefaults::CACHE_CAPACITY);
    }
}
