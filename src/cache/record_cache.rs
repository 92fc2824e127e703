//! Cache for a single record kind

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::config::KindSettings;
use crate::gate::{AcceptAll, IngestGate};
use crate::notify::{dispatch, NotificationHub, SubscriptionHandle};
use crate::pattern::UrlPattern;
use crate::record::{now_millis, Candidate, Payload, Record};
use crate::store::BoundedRecordStore;
use crate::wait::WaitCoordinator;
use crate::{NetCacheError, Result};

use super::CacheStats;

/// Bounded store, notification hub and ingest gate for one record kind
///
/// Store and subscriber list are only touched under the store lock, so an
/// existence check followed by a subscription can never miss a record that
/// is being ingested concurrently.
pub struct RecordCache<P: Payload> {
    store: Mutex<BoundedRecordStore<Arc<Record<P>>>>,
    hub: NotificationHub<Arc<Record<P>>>,
    gate: RwLock<Arc<dyn IngestGate<P>>>,
    /// Serializes delivery so subscribers see records in acceptance order
    dispatch: Mutex<()>,
    default_timeout_ms: AtomicU64,
    accepted: AtomicUsize,
    rejected: AtomicUsize,
    evicted: AtomicUsize,
    pending: AtomicUsize,
}

impl<P: Payload> RecordCache<P> {
    /// Create an empty cache, rejecting a zero capacity
    ///
    /// # Errors
    ///
    /// Returns error if `settings.capacity` is 0
    pub fn try_new(settings: KindSettings) -> Result<Self> {
        if settings.capacity == 0 {
            return Err(NetCacheError::ConfigError(format!(
                "{} capacity must be > 0",
                P::KIND
            )));
        }
        Ok(Self::new(settings))
    }

    /// Create an empty cache that accepts every candidate
    ///
    /// [`NetworkCache::new`](super::NetworkCache::new) validates settings
    /// before calling this; use [`RecordCache::try_new`] for unchecked input.
    ///
    /// # Panics
    ///
    /// Panics if `settings.capacity` is 0
    #[must_use]
    pub fn new(settings: KindSettings) -> Self {
        let gate: Arc<dyn IngestGate<P>> = Arc::new(AcceptAll);

        Self {
            store: Mutex::new(BoundedRecordStore::new(settings.capacity)),
            hub: NotificationHub::new(),
            gate: RwLock::new(gate),
            dispatch: Mutex::new(()),
            default_timeout_ms: AtomicU64::new(settings.timeout.as_millis() as u64),
            accepted: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
            evicted: AtomicUsize::new(0),
            pending: AtomicUsize::new(0),
        }
    }

    /// Set capacity and, optionally, replace the ingest gate
    ///
    /// # Errors
    ///
    /// Returns error if `capacity` is 0
    pub fn configure(&self, capacity: usize, gate: Option<Arc<dyn IngestGate<P>>>) -> Result<()> {
        self.set_capacity(capacity)?;
        if let Some(gate) = gate {
            *self.gate.write() = gate;
        }
        Ok(())
    }

    /// Change how many records are retained, evicting the oldest to fit
    ///
    /// # Errors
    ///
    /// Returns error if `capacity` is 0
    pub fn set_capacity(&self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(NetCacheError::ConfigError(format!(
                "{} capacity must be > 0",
                P::KIND
            )));
        }

        let evicted = self.store.lock().set_capacity(capacity);
        self.evicted.fetch_add(evicted, Ordering::Relaxed);
        debug!(
            "{} capacity set to {} ({} evicted)",
            P::KIND,
            capacity,
            evicted
        );
        Ok(())
    }

    /// Replace the ingest gate
    pub fn set_gate<G>(&self, gate: G)
    where
        G: IngestGate<P> + 'static,
    {
        *self.gate.write() = Arc::new(gate);
    }

    /// Change the budget used by [`RecordCache::wait_default`]
    pub fn set_default_timeout(&self, timeout: Duration) {
        self.default_timeout_ms
            .store(timeout.as_millis() as u64, Ordering::Relaxed);
    }

    /// Budget used by [`RecordCache::wait_default`]
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms.load(Ordering::Relaxed))
    }

    /// Offer a candidate to the cache
    ///
    /// The gate decides first. An accepted record is stamped, stored and
    /// delivered to every current subscriber before this returns. Returns
    /// `None` if the gate rejected the candidate.
    ///
    /// # Errors
    ///
    /// Returns [`NetCacheError::ValidatorFailed`] if the gate itself failed;
    /// the candidate is discarded
    pub async fn ingest(&self, candidate: Candidate<P>) -> Result<Option<Arc<Record<P>>>> {
        let record = candidate.into_record(now_millis());

        let gate = Arc::clone(&*self.gate.read());
        match gate.accepts(&record).await {
            Ok(true) => {}
            Ok(false) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                trace!("{} rejected: {}", P::KIND, record.url());
                return Ok(None);
            }
            Err(e) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                return Err(NetCacheError::ValidatorFailed {
                    url: record.url().to_string(),
                    reason: format!("{e:#}"),
                });
            }
        }

        let record = Arc::new(record);

        let _dispatch = self.dispatch.lock();
        let subscribers = {
            let mut store = self.store.lock();
            let evicted = store.append(Arc::clone(&record));
            if evicted > 0 {
                self.evicted.fetch_add(evicted, Ordering::Relaxed);
                trace!("{} store evicted {} record(s)", P::KIND, evicted);
            }
            self.accepted.fetch_add(1, Ordering::Relaxed);
            self.hub.snapshot()
        };

        let delivered = dispatch(&subscribers, &record);
        trace!(
            "{} accepted: {} (delivered to {})",
            P::KIND,
            record.url(),
            delivered
        );

        Ok(Some(record))
    }

    /// Earliest retained record matching `pattern`
    #[must_use]
    pub fn exists(&self, pattern: &UrlPattern) -> Option<Arc<Record<P>>> {
        self.coordinator().find(pattern)
    }

    /// Earliest retained match, or the first matching record to arrive
    ///
    /// # Errors
    ///
    /// Returns [`NetCacheError::Timeout`] if nothing matches within `timeout`
    pub async fn wait(&self, pattern: &UrlPattern, timeout: Duration) -> Result<Arc<Record<P>>> {
        self.coordinator().wait(pattern, timeout).await
    }

    /// [`RecordCache::wait`] with the configured default budget
    ///
    /// # Errors
    ///
    /// Returns [`NetCacheError::Timeout`] if nothing matches in time
    pub async fn wait_default(&self, pattern: &UrlPattern) -> Result<Arc<Record<P>>> {
        self.wait(pattern, self.default_timeout()).await
    }

    /// All retained records matching `pattern`, oldest first
    #[must_use]
    pub fn find_all(&self, pattern: &UrlPattern) -> Vec<Arc<Record<P>>> {
        self.store
            .lock()
            .iter()
            .filter(|record| pattern.matches(record))
            .cloned()
            .collect()
    }

    /// All retained records, oldest first
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<Record<P>>> {
        self.store.lock().iter().cloned().collect()
    }

    /// Register an observer for every future accepted record
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&Arc<Record<P>>) + Send + Sync + 'static,
    {
        self.hub.subscribe(callback)
    }

    /// Remove an observer; unknown handles are ignored
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.hub.unsubscribe(handle);
    }

    /// Drop all retained records; pending waits keep waiting
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    /// Number of retained records
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Whether no records are retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Maximum number of retained records
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            retained: self.len(),
            pending_waits: self.pending.load(Ordering::Relaxed),
        }
    }

    fn coordinator(&self) -> WaitCoordinator<'_, P> {
        WaitCoordinator::new(&self.store, &self.hub, &self.pending)
    }
}

impl<P: Payload> fmt::Debug for RecordCache<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCache")
            .field("kind", &P::KIND)
            .field("capacity", &self.capacity())
            .field("default_timeout", &self.default_timeout())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl<P: Payload> Default for RecordCache<P> {
    fn default() -> Self {
        Self::new(KindSettings::default())
    }
}
