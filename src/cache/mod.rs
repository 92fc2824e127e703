//! Per-kind record caches and the request/response pair

mod network;
mod record_cache;

pub use network::NetworkCache;
pub use record_cache::RecordCache;

/// Counters describing one record cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Candidates that passed the gate and were stored
    pub accepted: usize,
    /// Candidates discarded by the gate, including gate failures
    pub rejected: usize,
    /// Records dropped to stay within capacity
    pub evicted: usize,
    /// Records currently retained
    pub retained: usize,
    /// Waits currently subscribed for a future record
    pub pending_waits: usize,
}
