//! Wait-for-match protocol
//!
//! A wait first checks the store, then subscribes and races the subscription
//! against a timer. Both steps happen under the store lock, so a record is
//! always either already stored or still to be published.

mod coordinator;

pub use coordinator::{Checked, PendingWait, WaitCoordinator};

/// Default wait budget in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;
