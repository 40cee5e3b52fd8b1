//! Search outcome types

use serde::Serialize;

use crate::repository::{EntityType, RegionKey, ResultSet};

/// Which path produced a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    /// Accepted verbatim from the remote aggregation endpoint
    Remote,
    /// Assembled from direct queries against the content tables
    Fallback,
    /// Query text was empty; nothing was fetched
    Empty,
}

/// Result set plus how it was obtained
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub results: ResultSet,
    pub source: SearchSource,
    /// Region key the query was scoped to, if the region resolved
    pub region: Option<RegionKey>,
    /// Direct-path collections that failed and were returned empty
    pub degraded: Vec<EntityType>,
}

impl SearchOutcome {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            results: ResultSet::empty(),
            source: SearchSource::Empty,
            region: None,
            degraded: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}
