//! Bounded in-memory record storage

mod bounded;

pub use bounded::BoundedRecordStore;

/// Default number of records retained per kind
pub const DEFAULT_CAPACITY: usize = 100;
