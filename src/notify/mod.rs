//! Publish/subscribe fan-out for accepted records

mod hub;

pub(crate) use hub::dispatch;
pub use hub::{Callback, NotificationHub, SubscriptionHandle};
