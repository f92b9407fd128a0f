//! Client metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one client
///
/// Shared by every clone of a `ChemSpider` handle.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Requests handed to the transport
    requests_sent: AtomicU64,
    /// Requests that ended in an error
    requests_failed: AtomicU64,
    /// Extra chunks produced by batch splitting
    batch_chunks: AtomicU64,
    /// Proxy property reads served from cache
    cache_hits: AtomicU64,
    /// Proxy property reads that triggered a fetch
    cache_misses: AtomicU64,
    /// Filter queries submitted
    queries_submitted: AtomicU64,
    /// Status polls issued
    status_polls: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_requests_sent(&self) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_requests_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_batch_chunks(&self, chunks: u64) {
        self.batch_chunks.fetch_add(chunks, Ordering::Relaxed);
    }

    pub fn increment_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cache_misses(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_submitted(&self) {
        self.queries_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_status_polls(&self) {
        self.status_polls.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests sent so far
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent.load(Ordering::Relaxed)
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            batch_chunks: self.batch_chunks.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            queries_submitted: self.queries_submitted.load(Ordering::Relaxed),
            status_polls: self.status_polls.load(Ordering::Relaxed),
        }
    }

    /// Current snapshot as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_sent: u64,
    pub requests_failed: u64,
    pub batch_chunks: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub queries_submitted: u64,
    pub status_polls: u64,
}
