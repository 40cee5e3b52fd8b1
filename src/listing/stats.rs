//! Lock-free statistics tracking for listing workers

use std::sync::atomic::{AtomicUsize, Ordering};

/// Lock-free listing statistics
#[derive(Debug, Default)]
pub struct ListingStats {
    pub pages_requested: AtomicUsize,
    pub pages_applied: AtomicUsize,
    pub gated_requests: AtomicUsize,
    pub stale_discards: AtomicUsize,
    pub duplicates_dropped: AtomicUsize,
    pub failures: AtomicUsize,
    pub resets: AtomicUsize,
}

impl ListingStats {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get snapshot of current statistics
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> ListingStatsSnapshot {
        ListingStatsSnapshot {
            pages_requested: self.pages_requested.load(Ordering::Relaxed),
            pages_applied: self.pages_applied.load(Ordering::Relaxed),
            gated_requests: self.gated_requests.load(Ordering::Relaxed),
            stale_discards: self.stale_discards.load(Ordering::Relaxed),
            duplicates_dropped: self.duplicates_dropped.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of listing statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingStatsSnapshot {
    pub pages_requested: usize,
    pub pages_applied: usize,
    pub gated_requests: usize,
    pub stale_discards: usize,
    pub duplicates_dropped: usize,
    pub failures: usize,
    pub resets: usize,
}
