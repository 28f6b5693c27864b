//! Configuration Module
//!
//! Loads cache, validation and server settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::resource::ResourceOptions;

/// Application configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default resource TTL in seconds
    pub default_ttl: u64,
    /// Sweep period for expired entries, in seconds
    pub sweep_interval: u64,
    /// Default auto-refresh period in seconds, 0 disables it
    pub refresh_interval: u64,
    /// Whether stale entries are served while revalidating
    pub stale_while_revalidate: bool,
    /// Debounce window for on-change form validation, in milliseconds
    pub validation_debounce_ms: u64,
    /// HTTP server port for the admin API
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Resource TTL in seconds (default: 300)
    /// - `SWEEP_INTERVAL` - Sweep period in seconds (default: 60)
    /// - `REFRESH_INTERVAL` - Auto-refresh period in seconds (default: 0, disabled)
    /// - `STALE_WHILE_REVALIDATE` - Serve stale data while refetching (default: true)
    /// - `VALIDATION_DEBOUNCE_MS` - Form validation debounce (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            refresh_interval: env_or("REFRESH_INTERVAL", defaults.refresh_interval),
            stale_while_revalidate: env_or(
                "STALE_WHILE_REVALIDATE",
                defaults.stale_while_revalidate,
            ),
            validation_debounce_ms: env_or(
                "VALIDATION_DEBOUNCE_MS",
                defaults.validation_debounce_ms,
            ),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Sweep period, at least one second.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    pub fn validation_debounce(&self) -> Duration {
        Duration::from_millis(self.validation_debounce_ms)
    }

    /// Builds resource options for `cache_key` from the configured defaults.
    pub fn resource_options(&self, cache_key: impl Into<String>) -> ResourceOptions {
        ResourceOptions::new(cache_key)
            .ttl(self.default_ttl())
            .refresh_interval(self.refresh_interval())
            .stale_while_revalidate(self.stale_while_revalidate)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            sweep_interval: 60,
            refresh_interval: 0,
            stale_while_revalidate: true,
            validation_debounce_ms: 300,
            server_port: 3000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
