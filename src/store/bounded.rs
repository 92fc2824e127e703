//! Drop-oldest bounded store

use std::collections::VecDeque;

use super::DEFAULT_CAPACITY;

/// Ordered store that keeps at most `capacity` of the most recent items
///
/// Items are held oldest-first. Appending past capacity drops from the front.
#[derive(Debug, Clone)]
pub struct BoundedRecordStore<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedRecordStore<T> {
    /// Create an empty store
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            items: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Append an item, returning how many old items were evicted
    pub fn append(&mut self, item: T) -> usize {
        self.items.push_back(item);
        self.evict_overflow()
    }

    /// First (oldest) retained item satisfying `matches`
    pub fn find_first<F>(&self, mut matches: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter().find(|item| matches(item))
    }

    /// Iterate over retained items, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Change the capacity, returning how many items were evicted to fit
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0
    pub fn set_capacity(&mut self, capacity: usize) -> usize {
        assert!(capacity > 0, "capacity must be > 0");

        self.capacity = capacity;
        self.evict_overflow()
    }

    /// Maximum number of retained items
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every retained item
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn evict_overflow(&mut self) -> usize {
        let overflow = self.items.len().saturating_sub(self.capacity);
        self.items.drain(..overflow);
        overflow
    }
}

impl<T> Default for BoundedRecordStore<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
