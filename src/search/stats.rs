//! Lock-free statistics tracking for the search aggregator

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free search statistics
#[derive(Debug, Default)]
pub struct SearchStats {
    pub searches: AtomicU64,
    pub empty_queries: AtomicU64,
    pub remote_successes: AtomicU64,
    pub fallbacks: AtomicU64,
    pub degraded_collections: AtomicU64,
    pub unresolved_regions: AtomicU64,
}

impl SearchStats {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current statistics
    #[must_use]
    pub fn snapshot(&self) -> SearchStatsSnapshot {
        SearchStatsSnapshot {
            searches: self.searches.load(Ordering::Relaxed),
            empty_queries: self.empty_queries.load(Ordering::Relaxed),
            remote_successes: self.remote_successes.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            degraded_collections: self.degraded_collections.load(Ordering::Relaxed),
            unresolved_regions: self.unresolved_regions.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of search statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStatsSnapshot {
    pub searches: u64,
    pub empty_queries: u64,
    pub remote_successes: u64,
    pub fallbacks: u64,
    pub degraded_collections: u64,
    pub unresolved_regions: u64,
}
