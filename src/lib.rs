//! Netcache - bounded, queryable cache of observed network traffic
//!
//! Retains the most recent requests and responses handed to it, answers
//! "has a call matching X happened?" and lets callers await the first call
//! matching a pattern, with a timeout.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::multiple_crate_versions
)]

pub mod cache;
pub mod config;
pub mod error;
pub mod gate;
pub mod notify;
pub mod pattern;
pub mod record;
pub mod scope;
pub mod store;
pub mod wait;

pub use cache::{CacheStats, NetworkCache, RecordCache};
pub use error::{NetCacheError, Result};
pub use pattern::UrlPattern;
pub use record::{Candidate, Record, RecordKind, RequestPayload, ResponsePayload};
