//! Check-then-subscribe wait coordination

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::notify::{NotificationHub, SubscriptionHandle};
use crate::pattern::UrlPattern;
use crate::record::{Payload, Record};
use crate::store::BoundedRecordStore;
use crate::{NetCacheError, Result};

/// Outcome of the synchronous first phase of a wait
pub enum Checked<'a, P: Payload> {
    /// A retained record already matches
    Found(Arc<Record<P>>),
    /// Nothing matched; a one-shot listener is now registered
    Subscribed(PendingWait<'a, P>, oneshot::Receiver<Arc<Record<P>>>),
}

/// Registered listener of an in-flight wait
///
/// Dropping it removes the listener from the hub, whichever way the wait
/// ended (match, timeout, or the caller dropping the future).
pub struct PendingWait<'a, P: Payload> {
    hub: &'a NotificationHub<Arc<Record<P>>>,
    handle: SubscriptionHandle,
    pending: &'a AtomicUsize,
}

impl<P: Payload> PendingWait<'_, P> {
    /// Hub subscription backing this wait
    #[must_use]
    pub(crate) fn handle(&self) -> SubscriptionHandle {
        self.handle
    }
}

impl<P: Payload> Drop for PendingWait<'_, P> {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.handle);
        self.pending.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Coordinates existence checks and waits over one record kind
pub struct WaitCoordinator<'a, P: Payload> {
    store: &'a Mutex<BoundedRecordStore<Arc<Record<P>>>>,
    hub: &'a NotificationHub<Arc<Record<P>>>,
    pending: &'a AtomicUsize,
}

impl<'a, P: Payload> WaitCoordinator<'a, P> {
    /// Build a coordinator over a kind's store and hub
    ///
    /// `pending` tracks the number of waits currently subscribed.
    pub fn new(
        store: &'a Mutex<BoundedRecordStore<Arc<Record<P>>>>,
        hub: &'a NotificationHub<Arc<Record<P>>>,
        pending: &'a AtomicUsize,
    ) -> Self {
        Self {
            store,
            hub,
            pending,
        }
    }

    /// Earliest retained record matching `pattern`
    #[must_use]
    pub fn find(&self, pattern: &UrlPattern) -> Option<Arc<Record<P>>> {
        self.store
            .lock()
            .find_first(|record| pattern.matches(record))
            .cloned()
    }

    /// Check the store and, on a miss, subscribe before releasing the lock
    pub fn check_or_subscribe(&self, pattern: &UrlPattern) -> Checked<'a, P> {
        let store = self.store.lock();

        if let Some(record) = store.find_first(|record| pattern.matches(record)) {
            return Checked::Found(Arc::clone(record));
        }

        let (tx, rx) = oneshot::channel();
        let slot = Mutex::new(Some(tx));
        let listener_pattern = pattern.clone();

        let handle = self.hub.subscribe(move |record: &Arc<Record<P>>| {
            if !listener_pattern.matches(record) {
                return;
            }
            // First match wins; later ones find the slot empty
            if let Some(tx) = slot.lock().take() {
                let _ = tx.send(Arc::clone(record));
            }
        });
        self.pending.fetch_add(1, Ordering::Relaxed);
        drop(store);

        Checked::Subscribed(
            PendingWait {
                hub: self.hub,
                handle,
                pending: self.pending,
            },
            rx,
        )
    }

    /// Resolve with the earliest matching record, or the first one to arrive
    ///
    /// # Errors
    ///
    /// Returns [`NetCacheError::Timeout`] if nothing matches within `timeout`
    pub async fn wait(&self, pattern: &UrlPattern, timeout: Duration) -> Result<Arc<Record<P>>> {
        let (pending, rx) = match self.check_or_subscribe(pattern) {
            Checked::Found(record) => {
                trace!("{} wait /{}/ satisfied from store", P::KIND, pattern);
                return Ok(record);
            }
            Checked::Subscribed(pending, rx) => (pending, rx),
        };

        let outcome = tokio::time::timeout(timeout, rx).await;
        drop(pending);

        match outcome {
            Ok(Ok(record)) => {
                debug!("{} wait /{}/ matched {}", P::KIND, pattern, record.url());
                Ok(record)
            }
            // Sender dropped: the listener was removed before it matched
            Ok(Err(_)) => {
                debug!(
                    "{} wait /{}/ lost its listener before the deadline",
                    P::KIND,
                    pattern
                );
                Err(NetCacheError::Timeout {
                    pattern: pattern.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(_) => {
                debug!(
                    "{} wait /{}/ timed out after {:?}",
                    P::KIND,
                    pattern,
                    timeout
                );
                Err(NetCacheError::Timeout {
                    pattern: pattern.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}
