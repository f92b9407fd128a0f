//! Observable client events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Client constructed
    ClientCreated,
    /// Configuration loaded from file or environment
    ConfigLoaded,

    // Requests
    /// Request dispatched to the transport
    RequestSent,
    /// Request succeeded and decoded
    RequestComplete,
    /// Request failed (HTTP, transport or decode)
    RequestFailed,
    /// Batch request split into chunks
    BatchChunked,

    // Entity cache
    /// Property not cached, fetching
    CacheMiss,

    // Asynchronous queries
    /// Filter query submitted
    QuerySubmitted,
    /// Status observed for a query
    QueryStatus,
    /// Query reached `Complete`
    QueryComplete,
    /// Query reached a failed terminal state
    QueryFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ClientCreated => "CLIENT_CREATED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RequestSent => "REQUEST_SENT",
            Event::RequestComplete => "REQUEST_COMPLETE",
            Event::RequestFailed => "REQUEST_FAILED",
            Event::BatchChunked => "BATCH_CHUNKED",
            Event::CacheMiss => "CACHE_MISS",
            Event::QuerySubmitted => "QUERY_SUBMITTED",
            Event::QueryStatus => "QUERY_STATUS",
            Event::QueryComplete => "QUERY_COMPLETE",
            Event::QueryFailed => "QUERY_FAILED",
        }
    }

    /// Default severity for this event
    pub fn severity(&self) -> Severity {
        match self {
            Event::RequestSent | Event::CacheMiss | Event::QueryStatus => Severity::Trace,
            Event::RequestFailed | Event::QueryFailed => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
