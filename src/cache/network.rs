//! Request/response cache pair

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::CacheConfig;
use crate::pattern::UrlPattern;
use crate::record::{
    Candidate, RecordKind, RequestPayload, RequestRecord, ResponsePayload, ResponseRecord,
};
use crate::Result;

use super::{CacheStats, RecordCache};

/// Caches for both record kinds of one owning context
#[derive(Debug)]
pub struct NetworkCache {
    requests: RecordCache<RequestPayload>,
    responses: RecordCache<ResponsePayload>,
}

impl NetworkCache {
    /// Create a cache pair from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate()?;

        let requests = config.for_kind(RecordKind::Request);
        let responses = config.for_kind(RecordKind::Response);
        debug!(
            "Creating network cache (requests: {}, responses: {})",
            requests.capacity, responses.capacity
        );

        Ok(Self {
            requests: RecordCache::new(requests),
            responses: RecordCache::new(responses),
        })
    }

    /// Request-side cache
    #[must_use]
    pub fn requests(&self) -> &RecordCache<RequestPayload> {
        &self.requests
    }

    /// Response-side cache
    #[must_use]
    pub fn responses(&self) -> &RecordCache<ResponsePayload> {
        &self.responses
    }

    /// Ingest an observed request
    ///
    /// # Errors
    ///
    /// Returns error if the request gate fails
    pub async fn record_request(
        &self,
        url: impl Into<String>,
        payload: RequestPayload,
    ) -> Result<Option<Arc<RequestRecord>>> {
        self.requests.ingest(Candidate::new(url, payload)).await
    }

    /// Ingest an observed response
    ///
    /// # Errors
    ///
    /// Returns error if the response gate fails
    pub async fn record_response(
        &self,
        url: impl Into<String>,
        payload: ResponsePayload,
    ) -> Result<Option<Arc<ResponseRecord>>> {
        self.responses.ingest(Candidate::new(url, payload)).await
    }

    /// Earliest retained request matching `pattern`
    #[must_use]
    pub fn request_exists(&self, pattern: &UrlPattern) -> Option<Arc<RequestRecord>> {
        self.requests.exists(pattern)
    }

    /// Earliest retained response matching `pattern`
    #[must_use]
    pub fn response_exists(&self, pattern: &UrlPattern) -> Option<Arc<ResponseRecord>> {
        self.responses.exists(pattern)
    }

    /// Wait for a matching request using the configured default budget
    ///
    /// # Errors
    ///
    /// Returns error if no matching request arrives in time
    pub async fn wait_for_request(&self, pattern: &UrlPattern) -> Result<Arc<RequestRecord>> {
        self.requests.wait_default(pattern).await
    }

    /// Wait for a matching request within `timeout`
    ///
    /// # Errors
    ///
    /// Returns error if no matching request arrives in time
    pub async fn wait_for_request_within(
        &self,
        pattern: &UrlPattern,
        timeout: Duration,
    ) -> Result<Arc<RequestRecord>> {
        self.requests.wait(pattern, timeout).await
    }

    /// Wait for a matching response using the configured default budget
    ///
    /// # Errors
    ///
    /// Returns error if no matching response arrives in time
    pub async fn wait_for_response(&self, pattern: &UrlPattern) -> Result<Arc<ResponseRecord>> {
        self.responses.wait_default(pattern).await
    }

    /// Wait for a matching response within `timeout`
    ///
    /// # Errors
    ///
    /// Returns error if no matching response arrives in time
    pub async fn wait_for_response_within(
        &self,
        pattern: &UrlPattern,
        timeout: Duration,
    ) -> Result<Arc<ResponseRecord>> {
        self.responses.wait(pattern, timeout).await
    }

    /// Drop every retained record of both kinds
    pub fn clear(&self) {
        self.requests.clear();
        self.responses.clear();
    }

    /// Counters for both kinds, requests first
    #[must_use]
    pub fn stats(&self) -> (CacheStats, CacheStats) {
        (self.requests.stats(), self.responses.stats())
    }
}

impl Default for NetworkCache {
    fn default() -> Self {
        Self {
            requests: RecordCache::default(),
            responses: RecordCache::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KindOverrides;
    use crate::NetCacheError;

    #[tokio::test]
    async fn test_kinds_are_independent() {
        let cache = NetworkCache::default();

        cache
            .record_request("https://x/api", RequestPayload::default())
            .await
            .unwrap();

        let pattern = UrlPattern::new("x/api").unwrap();
        assert!(cache.request_exists(&pattern).is_some());
        assert!(cache.response_exists(&pattern).is_none());

        let err = cache
            .wait_for_response_within(&pattern, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_per_kind_capacity() {
        let config = CacheConfig {
            capacity: 3,
            responses: KindOverrides {
                capacity: Some(1),
                timeout_ms: None,
            },
            ..CacheConfig::default()
        };
        let cache = NetworkCache::new(&config).unwrap();

        for i in 0..3 {
            let url = format!("https://x/{i}");
            cache
                .record_request(url.as_str(), RequestPayload::default())
                .await
                .unwrap();
            cache
                .record_response(url, ResponsePayload::default())
                .await
                .unwrap();
        }

        let (requests, responses) = cache.stats();
        assert_eq!(requests.retained, 3);
        assert_eq!(responses.retained, 1);
        assert_eq!(responses.evicted, 2);
    }

    #[tokio::test]
    async fn test_response_payload_passes_through() {
        let cache = NetworkCache::default();
        let pattern = UrlPattern::new("image").unwrap();
        let waiter = cache.wait_for_response(&pattern);

        let (record, _) = tokio::join!(waiter, async {
            cache
                .record_response(
                    "https://cdn/image.png",
                    ResponsePayload {
                        status: 200,
                        body: bytes::Bytes::from_static(b"\x89PNG"),
                        ..ResponsePayload::default()
                    },
                )
                .await
                .unwrap();
        });

        let record = record.unwrap();
        assert_eq!(record.payload().status, 200);
        assert_eq!(&record.payload().body[..], b"\x89PNG");
    }

    #[test]
    fn test_debug_lists_both_kinds() {
        let rendered = format!("{:?}", NetworkCache::default());
        assert!(rendered.contains("kind: Request"));
        assert!(rendered.contains("kind: Response"));
    }

    #[test]
    fn test_invalid_config() {
        let config = CacheConfig {
            capacity: 0,
            ..CacheConfig::default()
        };
        assert!(matches!(
            NetworkCache::new(&config),
            Err(NetCacheError::ConfigError(_))
        ));
    }
}
