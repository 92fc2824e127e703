//! Per-context cache scopes
//!
//! Each owning context (a page, a whole browser) gets its own
//! [`NetworkCache`]. Scopes are created on first use and live until removed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::cache::NetworkCache;
use crate::config::CacheConfig;
use crate::{NetCacheError, Result};

/// Maximum number of concurrently live scopes
pub const MAX_SCOPES: usize = 1024;

/// Scope used when the caller does not name one
pub const DEFAULT_SCOPE: &str = "default";

/// Registry of caches keyed by scope name
pub struct ScopeRegistry {
    scopes: DashMap<String, Arc<NetworkCache>>,
    config: CacheConfig,
    scope_count: AtomicUsize,
}

impl ScopeRegistry {
    /// Create an empty registry; every scope uses `config`
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            scopes: DashMap::new(),
            config,
            scope_count: AtomicUsize::new(0),
        })
    }

    /// Get or create the cache for a scope
    ///
    /// # Errors
    ///
    /// Returns error if the scope limit is reached or the name is invalid
    pub fn get_or_create(&self, scope: &str) -> Result<Arc<NetworkCache>> {
        if let Some(cache) = self.scopes.get(scope) {
            return Ok(Arc::clone(&cache));
        }

        validate_scope_name(scope)?;

        match self.scopes.entry(scope.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                // Reserve a slot first so concurrent creators cannot overshoot
                self.scope_count
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                        (n < MAX_SCOPES).then_some(n + 1)
                    })
                    .map_err(|_| NetCacheError::ScopeLimit(MAX_SCOPES))?;

                let cache = match NetworkCache::new(&self.config) {
                    Ok(cache) => Arc::new(cache),
                    Err(e) => {
                        self.scope_count.fetch_sub(1, Ordering::AcqRel);
                        return Err(e);
                    }
                };
                entry.insert(Arc::clone(&cache));

                debug!("Created cache scope '{}'", scope);
                Ok(cache)
            }
        }
    }

    /// Cache for the default scope
    ///
    /// # Errors
    ///
    /// Returns error if the scope limit is reached
    pub fn default_scope(&self) -> Result<Arc<NetworkCache>> {
        self.get_or_create(DEFAULT_SCOPE)
    }

    /// Cache for an existing scope
    #[must_use]
    pub fn get(&self, scope: &str) -> Option<Arc<NetworkCache>> {
        self.scopes.get(scope).map(|cache| Arc::clone(&cache))
    }

    /// Tear down a scope
    ///
    /// Waits already running against the removed cache keep their own handle
    /// to it and settle normally.
    pub fn remove(&self, scope: &str) -> Option<Arc<NetworkCache>> {
        let removed = self.scopes.remove(scope).map(|(_, cache)| cache);
        if removed.is_some() {
            self.scope_count.fetch_sub(1, Ordering::AcqRel);
            debug!("Removed cache scope '{}'", scope);
        }
        removed
    }

    /// Number of live scopes
    #[must_use]
    pub fn scope_count(&self) -> usize {
        self.scope_count.load(Ordering::Acquire)
    }

    /// Tear down every scope
    pub fn clear(&self) {
        info!("Clearing {} cache scope(s)", self.scope_count());
        // Per-entry removal keeps the count exact against concurrent creates
        self.scopes.retain(|_, _| {
            self.scope_count.fetch_sub(1, Ordering::AcqRel);
            false
        });
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self {
            scopes: DashMap::new(),
            config: CacheConfig::default(),
            scope_count: AtomicUsize::new(0),
        }
    }
}

/// Validate a scope name
///
/// # Errors
///
/// Returns error if the name is empty, too long, or contains control characters
fn validate_scope_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(NetCacheError::InvalidScopeName(
            "Scope name cannot be empty".to_string(),
        ));
    }

    if name.len() > 255 {
        return Err(NetCacheError::InvalidScopeName(format!(
            "Scope name too long: {} > 255",
            name.len()
        )));
    }

    if name.chars().any(char::is_control) {
        return Err(NetCacheError::InvalidScopeName(
            "Scope name cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::UrlPattern;
    use crate::record::RequestPayload;

    #[test]
    fn test_registry_create() {
        let registry = ScopeRegistry::default();
        assert_eq!(registry.scope_count(), 0);

        registry.get_or_create("page-1").unwrap();
        assert_eq!(registry.scope_count(), 1);
        assert!(registry.get("page-1").is_some());
        assert!(registry.get("page-2").is_none());
    }

    #[test]
    fn test_registry_reuse() {
        let registry = ScopeRegistry::default();

        let first = registry.get_or_create("page-1").unwrap();
        let second = registry.get_or_create("page-1").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.scope_count(), 1);
    }

    #[tokio::test]
    async fn test_scopes_are_isolated() {
        let registry = ScopeRegistry::default();
        let page = registry.get_or_create("page-1").unwrap();
        let browser = registry.default_scope().unwrap();

        page.record_request("https://x/1", RequestPayload::default())
            .await
            .unwrap();

        let pattern = UrlPattern::new("x/1").unwrap();
        assert!(page.request_exists(&pattern).is_some());
        assert!(browser.request_exists(&pattern).is_none());
    }

    #[test]
    fn test_registry_remove_and_clear() {
        let registry = ScopeRegistry::default();
        registry.get_or_create("a").unwrap();
        registry.get_or_create("b").unwrap();

        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        assert_eq!(registry.scope_count(), 1);

        registry.clear();
        assert_eq!(registry.scope_count(), 0);
        assert!(registry.get("b").is_none());
    }

    #[test]
    fn test_scope_limit() {
        let registry = ScopeRegistry::default();
        for i in 0..MAX_SCOPES {
            registry.get_or_create(&format!("scope-{i}")).unwrap();
        }

        let err = registry.get_or_create("one-too-many").unwrap_err();
        assert!(matches!(err, NetCacheError::ScopeLimit(MAX_SCOPES)));

        // Existing scopes remain reachable at the limit
        assert!(registry.get_or_create("scope-0").is_ok());
    }

    #[test]
    fn test_scope_limit_holds_under_concurrent_creation() {
        let registry = ScopeRegistry::default();

        std::thread::scope(|s| {
            for t in 0..8 {
                let registry = &registry;
                s.spawn(move || {
                    for i in 0..200 {
                        let _ = registry.get_or_create(&format!("scope-{t}-{i}"));
                    }
                });
            }
        });

        assert_eq!(registry.scope_count(), MAX_SCOPES);
        assert_eq!(registry.scopes.len(), MAX_SCOPES);

        registry.clear();
        assert_eq!(registry.scope_count(), 0);
        assert!(registry.scopes.is_empty());
        assert!(registry.get_or_create("fresh").is_ok());
    }

    #[test]
    fn test_validate_scope_name() {
        assert!(validate_scope_name("page-1").is_ok());
        assert!(validate_scope_name("browser/tab 3").is_ok());

        assert!(validate_scope_name("").is_err());
        assert!(validate_scope_name(&"x".repeat(256)).is_err());
        assert!(validate_scope_name("bad\0name").is_err());
        assert!(validate_scope_name("bad\nname").is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CacheConfig {
            timeout_ms: 0,
            ..CacheConfig::default()
        };
        assert!(ScopeRegistry::new(config).is_err());
    }
}
