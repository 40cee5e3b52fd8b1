//! Search session: last-write-wins application of search results
//!
//! Every query change is tagged with a sequence number. Searches run
//! concurrently, but a result is applied only while its sequence is still
//! the latest issued, so a slow response to an old query never replaces the
//! results of a newer one.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::aggregator::SearchAggregator;
use crate::events::{CoreEvent, CoreEventBus};
use crate::repository::{ErrorKind, Query, ResultSet};

#[derive(Debug, Default)]
struct Applied {
    sequence: u64,
    query: Option<Query>,
    results: ResultSet,
}

/// Owns the current result set for one search box
#[derive(Debug)]
pub struct SearchSession {
    aggregator: Arc<SearchAggregator>,
    issued: AtomicU64,
    discarded: AtomicU64,
    applied: Mutex<Applied>,
    events: Option<CoreEventBus>,
}

impl SearchSession {
    pub fn new(aggregator: Arc<SearchAggregator>) -> Self {
        Self {
            aggregator,
            issued: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            applied: Mutex::new(Applied::default()),
            events: None,
        }
    }

    /// Publish applied results and degradations on `bus`
    #[must_use]
    pub fn with_events(mut self, bus: CoreEventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Run `query` and apply its results if no newer query was issued
    /// meanwhile.
    ///
    /// Returns the applied result set, or `None` when the result was stale
    /// and discarded.
    pub async fn on_query_changed(&self, query: Query) -> Option<ResultSet> {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.aggregator.search_detailed(&query).await;

        let mut applied = self.applied.lock();
        let latest = self.issued.load(Ordering::SeqCst);
        if sequence != latest || sequence <= applied.sequence {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            debug!(sequence, latest, query = %query.text, "Discarding stale search result");
            return None;
        }

        applied.sequence = sequence;
        applied.query = Some(query.clone());
        applied.results = outcome.results.clone();

        // Published under the lock so subscribers see results in sequence order
        if let Some(bus) = &self.events {
            if outcome.is_degraded() {
                let message = format!(
                    "Search for '{}' returned partial results: {:?} unavailable",
                    query.text, outcome.degraded
                );
                let _ = bus.publish(CoreEvent::error(ErrorKind::PartialCollectionFailure, message));
            }
            let _ = bus.publish(CoreEvent::result_set_ready(
                sequence,
                query,
                outcome.results.clone(),
                outcome.source,
            ));
        }

        Some(outcome.results)
    }

    /// Results of the most recently applied query
    #[must_use]
    pub fn current(&self) -> ResultSet {
        self.applied.lock().results.clone()
    }

    #[must_use]
    pub fn current_query(&self) -> Option<Query> {
        self.applied.lock().query.clone()
    }

    /// Sequence number of the most recently applied query (0 before any)
    #[must_use]
    pub fn applied_sequence(&self) -> u64 {
        self.applied.lock().sequence
    }

    #[must_use]
    pub fn latest_sequence(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Number of results dropped because a newer query had been issued
    #[must_use]
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn aggregator(&self) -> &Arc<SearchAggregator> {
        &self.aggregator
    }
}
