//! Ingest validation hooks

use async_trait::async_trait;

use crate::record::{Payload, Record};

/// Accept/reject decision applied to every candidate before it is stored
///
/// Returning `Ok(false)` silently discards the candidate. Returning an error
/// also discards it, and the error is surfaced to the ingest caller.
#[async_trait]
pub trait IngestGate<P: Payload>: Send + Sync {
    /// Decide whether `candidate` enters the cache
    async fn accepts(&self, candidate: &Record<P>) -> anyhow::Result<bool>;
}

/// Gate that accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl<P: Payload> IngestGate<P> for AcceptAll {
    async fn accepts(&self, _candidate: &Record<P>) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Gate backed by a synchronous predicate
pub struct PredicateGate<F> {
    predicate: F,
}

impl<F> PredicateGate<F> {
    /// Wrap a predicate
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

#[async_trait]
impl<P, F> IngestGate<P> for PredicateGate<F>
where
    P: Payload,
    F: Fn(&Record<P>) -> bool + Send + Sync,
{
    async fn accepts(&self, candidate: &Record<P>) -> anyhow::Result<bool> {
        Ok((self.predicate)(candidate))
    }
}
