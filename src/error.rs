//! Error types for Netcache

use std::io;
use thiserror::Error;

/// Result type for Netcache operations
pub type Result<T> = std::result::Result<T, NetCacheError>;

/// Errors that can occur in Netcache
#[derive(Debug, Error)]
pub enum NetCacheError {
    /// No matching record arrived before the wait budget elapsed
    #[error("Timed out after {timeout_ms} ms waiting for a record matching /{pattern}/")]
    Timeout {
        /// Source of the pattern being waited on
        pattern: String,
        /// Configured wait budget
        timeout_ms: u64,
    },

    /// The ingest validator itself failed; the candidate was discarded
    #[error("Validator failed for {url}: {reason}")]
    ValidatorFailed {
        /// URL of the discarded candidate
        url: String,
        /// Formatted error chain reported by the validator
        reason: String,
    },

    /// URL pattern did not compile
    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Too many cache scopes alive at once
    #[error("Scope limit reached: {0}")]
    ScopeLimit(usize),

    /// Invalid scope name
    #[error("Invalid scope name: {0}")]
    InvalidScopeName(String),
}

impl NetCacheError {
    /// Whether this error is a wait timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
