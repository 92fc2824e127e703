//! Observed traffic records
//!
//! A record is the unit of storage: a URL, the time it was accepted by the
//! cache, and a kind-specific payload the cache never looks into.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

/// Discriminator between the two record streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Outgoing request
    Request,
    /// Incoming response
    Response,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.pad("request"),
            Self::Response => f.pad("response"),
        }
    }
}

/// Payload carried by a record of one kind
pub trait Payload: Send + Sync + 'static {
    /// Stream this payload belongs to
    const KIND: RecordKind;
}

/// Request-side payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPayload {
    /// HTTP method (e.g., "GET", "POST")
    pub method: String,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Request body (post data)
    pub body: Bytes,
    /// Resource type reported by the browser (document, xhr, image, ...)
    pub resource_type: Option<String>,
}

impl Payload for RequestPayload {
    const KIND: RecordKind = RecordKind::Request;
}

/// Response-side payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponsePayload {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Bytes,
    /// Whether the browser served this response from its own cache
    pub from_cache: bool,
}

impl Payload for ResponsePayload {
    const KIND: RecordKind = RecordKind::Response;
}

/// A record offered for ingest, not yet timestamped
#[derive(Debug, Clone)]
pub struct Candidate<P> {
    /// Full URL of the observed exchange
    pub url: String,
    /// Kind-specific payload
    pub payload: P,
}

impl<P> Candidate<P> {
    /// Create a new candidate
    pub fn new(url: impl Into<String>, payload: P) -> Self {
        Self {
            url: url.into(),
            payload,
        }
    }

    /// Stamp the candidate with its capture time
    pub(crate) fn into_record(self, captured_at: u64) -> Record<P> {
        Record {
            url: self.url,
            captured_at,
            payload: self.payload,
        }
    }
}

/// An accepted, immutable record
///
/// Records are handed out as `Arc<Record<P>>`; there is no way to mutate one
/// after it has been stamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<P> {
    url: String,
    captured_at: u64,
    payload: P,
}

impl<P> Record<P> {
    /// URL the record was captured for
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Milliseconds since the Unix epoch at which the record was ingested
    #[must_use]
    pub fn captured_at(&self) -> u64 {
        self.captured_at
    }

    /// Kind-specific payload
    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }
}

/// Record of an outgoing request
pub type RequestRecord = Record<RequestPayload>;

/// Record of an incoming response
pub type ResponseRecord = Record<ResponsePayload>;

/// Current wall-clock time in milliseconds since the Unix epoch
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
