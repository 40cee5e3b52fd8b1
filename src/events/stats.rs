//! Delivery statistics for the core event bus

use std::sync::atomic::{AtomicU64, Ordering};

use super::types::CoreEvent;

/// Per-event-kind delivery counters
#[derive(Debug, Default)]
pub struct EventBusStats {
    pub result_sets: AtomicU64,
    pub pages_appended: AtomicU64,
    pub listing_resets: AtomicU64,
    pub errors: AtomicU64,
    /// Events sent while nobody was subscribed
    pub undelivered: AtomicU64,
    /// Events receivers skipped because they fell behind
    pub lagged: AtomicU64,
}

impl EventBusStats {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter bumped when `event` is delivered; `Shutdown` is not counted
    pub(crate) fn counter_for(&self, event: &CoreEvent) -> Option<&AtomicU64> {
        match event {
            CoreEvent::ResultSetReady { .. } => Some(&self.result_sets),
            CoreEvent::PageAppended { .. } => Some(&self.pages_appended),
            CoreEvent::ListingReset { .. } => Some(&self.listing_resets),
            CoreEvent::Error { .. } => Some(&self.errors),
            CoreEvent::Shutdown { .. } => None,
        }
    }

    pub(crate) fn record_undelivered(&self) {
        self.undelivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lagged(&self, missed: u64) {
        self.lagged.fetch_add(missed, Ordering::Relaxed);
    }

    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> EventBusStatsSnapshot {
        EventBusStatsSnapshot {
            result_sets: self.result_sets.load(Ordering::Relaxed),
            pages_appended: self.pages_appended.load(Ordering::Relaxed),
            listing_resets: self.listing_resets.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            undelivered: self.undelivered.load(Ordering::Relaxed),
            lagged: self.lagged.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of event bus statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventBusStatsSnapshot {
    pub result_sets: u64,
    pub pages_appended: u64,
    pub listing_resets: u64,
    pub errors: u64,
    pub undelivered: u64,
    pub lagged: u64,
}

impl EventBusStatsSnapshot {
    /// Events that reached at least one subscriber
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.result_sets + self.pages_appended + self.listing_resets + self.errors
    }
}
