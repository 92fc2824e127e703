//! Configuration types for Netcache

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::record::RecordKind;
use crate::store::DEFAULT_CAPACITY;
use crate::wait::DEFAULT_TIMEOUT_MS;
use crate::{NetCacheError, Result};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Records retained per kind
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Default wait budget in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Request-stream overrides
    #[serde(default)]
    pub requests: KindOverrides,
    /// Response-stream overrides
    #[serde(default)]
    pub responses: KindOverrides,
}

/// Per-kind overrides of the top-level settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindOverrides {
    /// Records retained for this kind
    pub capacity: Option<usize>,
    /// Default wait budget for this kind
    pub timeout_ms: Option<u64>,
}

/// Resolved settings for one record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSettings {
    /// Records retained
    pub capacity: usize,
    /// Default wait budget
    pub timeout: Duration,
}

impl Default for KindSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            requests: KindOverrides::default(),
            responses: KindOverrides::default(),
        }
    }
}

impl CacheConfig {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NetCacheError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if the text cannot be parsed or fails validation
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| NetCacheError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if any capacity or timeout is zero
    pub fn validate(&self) -> Result<()> {
        for kind in [RecordKind::Request, RecordKind::Response] {
            let settings = self.for_kind(kind);

            if settings.capacity == 0 {
                return Err(NetCacheError::ConfigError(format!(
                    "{kind} capacity must be > 0"
                )));
            }

            if settings.timeout.is_zero() {
                return Err(NetCacheError::ConfigError(format!(
                    "{kind} timeout_ms must be > 0"
                )));
            }
        }

        Ok(())
    }

    /// Settings for one kind, overrides applied
    #[must_use]
    pub fn for_kind(&self, kind: RecordKind) -> KindSettings {
        let overrides = match kind {
            RecordKind::Request => self.requests,
            RecordKind::Response => self.responses,
        };

        KindSettings {
            capacity: overrides.capacity.unwrap_or(self.capacity),
            timeout: Duration::from_millis(overrides.timeout_ms.unwrap_or(self.timeout_ms)),
        }
    }
}
