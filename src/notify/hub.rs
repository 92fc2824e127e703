//! Notification hub

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

/// Subscriber callback
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Opaque handle returned by [`NotificationHub::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Synchronous fan-out to every registered subscriber
///
/// Callbacks run on the publishing thread, in subscription order, against a
/// snapshot taken when publishing starts. A callback may unsubscribe itself
/// or others while running; a panicking callback does not stop the rest.
pub struct NotificationHub<T> {
    subscribers: Mutex<Vec<(SubscriptionHandle, Callback<T>)>>,
    next_id: AtomicU64,
}

impl<T> NotificationHub<T> {
    /// Create a hub with no subscribers
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a callback for every future published item
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let handle = SubscriptionHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((handle, Arc::new(callback)));
        handle
    }

    /// Remove a subscription
    ///
    /// Returns `false` if the handle was already gone.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(h, _)| *h != handle);
        subscribers.len() != before
    }

    /// Deliver an item to every current subscriber
    ///
    /// Returns the number of callbacks invoked.
    pub fn publish(&self, item: &T) -> usize {
        let snapshot = self.snapshot();
        dispatch(&snapshot, item)
    }

    /// Current subscribers, in subscription order
    pub(crate) fn snapshot(&self) -> Vec<Callback<T>> {
        self.subscribers
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }

    /// Number of live subscriptions
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<T> Default for NotificationHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Invoke each callback in turn, isolating panics
pub(crate) fn dispatch<T>(callbacks: &[Callback<T>], item: &T) -> usize {
    for (index, callback) in callbacks.iter().enumerate() {
        if catch_unwind(AssertUnwindSafe(|| callback(item))).is_err() {
            warn!("Subscriber {} panicked; continuing delivery", index);
        }
    }
    callbacks.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_publish_in_subscription_order() {
        let hub = NotificationHub::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            hub.subscribe(move |item: &u32| seen.lock().push((tag, *item)));
        }

        assert_eq!(hub.publish(&7), 2);
        assert_eq!(*seen.lock(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let hub = NotificationHub::<u32>::new();
        let handle = hub.subscribe(|_| {});

        assert!(hub.unsubscribe(handle));
        assert!(!hub.unsubscribe(handle));
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.publish(&1), 0);
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let hub = NotificationHub::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        hub.subscribe(|_| panic!("subscriber failure"));
        let counter = Arc::clone(&calls);
        hub.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        hub.publish(&1);
        hub.publish(&2);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscriber_can_unsubscribe_during_publish() {
        let hub = Arc::new(NotificationHub::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let handle_slot = Arc::new(Mutex::new(None));

        let hub_ref = Arc::clone(&hub);
        let slot = Arc::clone(&handle_slot);
        let counter = Arc::clone(&calls);
        let handle = hub.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(handle) = slot.lock().take() {
                hub_ref.unsubscribe(handle);
            }
        });
        *handle_slot.lock() = Some(handle);

        // Late subscriber registered after the self-removing one still runs
        let late = Arc::new(AtomicUsize::new(0));
        let late_counter = Arc::clone(&late);
        hub.subscribe(move |_| {
            late_counter.fetch_add(1, Ordering::SeqCst);
        });

        hub.publish(&1);
        hub.publish(&2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(late.load(Ordering::SeqCst), 2);
        assert_eq!(hub.subscriber_count(), 1);
    }
}
