//! Resolver configuration

pub mod timing;

pub use timing::{with_timeout, DEFAULT_CACHE_TTL_SECS, DEFAULT_LOOKUP_TIMEOUT_MS};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`crate::Resolver`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Timeout applied to each remote HTTP and DNS call; zero disables it
    /// (default: 5000ms)
    pub timeout: Duration,
    /// Time-to-live of cached resolutions (default: 24h)
    pub cache_ttl: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl ResolverConfig {
    /// Create a new ResolverConfig builder
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl.is_zero() {
            return Err(ConfigError("cache_ttl must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for ResolverConfig
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    /// Set the per-call timeout for remote and DNS lookups
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the cache TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResolverConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ResolverConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
