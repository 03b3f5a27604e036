//! Configuration Module
//!
//! Engine configuration plus the admin server settings, loaded from
//! environment variables with sensible defaults.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Defaults ==
const DEFAULT_MAX_ENTRIES: usize = 100;
const DEFAULT_TTL_SECS: u64 = 30 * 60;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
const DEFAULT_SERVER_PORT: u16 = 3000;

/// Engine configuration shared by all three namespaces.
///
/// Only the memory-pressure path lowers `max_entries_per_namespace` at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries each namespace can hold
    pub max_entries_per_namespace: usize,
    /// Age after which an entry is treated as absent
    pub ttl: Duration,
    /// Interval between background sweeps of expired entries
    pub sweep_interval: Duration,
}

impl Config {
    /// Creates a validated configuration.
    pub fn new(max_entries_per_namespace: usize, ttl: Duration, sweep_interval: Duration) -> Result<Self> {
        let config = Self {
            max_entries_per_namespace,
            ttl,
            sweep_interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is strictly positive.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries_per_namespace == 0 {
            return Err(CacheError::InvalidConfig(
                "max_entries_per_namespace must be greater than zero".to_string(),
            ));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig("ttl must be greater than zero".to_string()));
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Entries per namespace (default: 100)
    /// - `CACHE_TTL_SECS` - Entry lifetime in seconds (default: 1800)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 60)
    ///
    /// Missing, unparsable or zero values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let positive = |name: &str, default: u64| {
            lookup(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        Self {
            max_entries_per_namespace: positive("CACHE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES as u64)
                as usize,
            ttl: Duration::from_secs(positive("CACHE_TTL_SECS", DEFAULT_TTL_SECS)),
            sweep_interval: Duration::from_secs(positive(
                "CACHE_SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL_SECS,
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries_per_namespace: DEFAULT_MAX_ENTRIES,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Settings for the admin HTTP binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port
    pub port: u16,
    /// Engine configuration
    pub cache: Config,
}

impl ServerConfig {
    /// Loads `SERVER_PORT` (default: 3000) plus the engine variables.
    pub fn from_env() -> Self {
        Self {
            port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            cache: Config::from_env(),
        }
    }
}
