//! Configuration Module
//!
//! Handles loading cache and guardian configuration from environment variables.

use std::env;
use std::time::Duration;

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries each default store can hold
    pub max_entries: usize,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Admin HTTP server port
    pub server_port: u16,
    /// Memory guardian polling interval in seconds
    pub cleanup_interval: u64,
    /// Memory budget in megabytes the guardian measures pressure against
    pub memory_budget_mb: u64,
    /// Whether the guardian starts automatically at startup
    pub guardian_enabled: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum entries per store (default: 1000)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - Admin HTTP server port (default: 3000)
    /// - `CACHE_CLEANUP_INTERVAL` - Guardian tick interval in seconds (default: 30)
    /// - `CACHE_MEMORY_BUDGET_MB` - Assumed memory budget (default: 512)
    /// - `CACHE_GUARDIAN_ENABLED` - `1`/`true` to autostart the guardian (default: off)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("CACHE_MAX_ENTRIES").unwrap_or(defaults.max_entries),
            default_ttl: parse_var("CACHE_DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CACHE_CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
            memory_budget_mb: parse_var("CACHE_MEMORY_BUDGET_MB")
                .unwrap_or(defaults.memory_budget_mb),
            guardian_enabled: env::var("CACHE_GUARDIAN_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.guardian_enabled),
        }
    }

    /// Default TTL as a Duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Guardian tick interval as a Duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }

    /// Memory budget in bytes.
    pub fn memory_budget_bytes(&self) -> u64 {
        self.memory_budget_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 300,
            server_port: 3000,
            cleanup_interval: 30,
            memory_budget_mb: 512,
            guardian_enabled: false,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
