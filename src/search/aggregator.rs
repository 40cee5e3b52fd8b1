//! Federated search aggregator
//!
//! One free-text query in, one [`ResultSet`] out. The remote aggregation
//! endpoint is tried first; any failure there falls back to [`DirectSearch`].
//! The aggregator never fails: the worst case is an empty result set.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::fallback::{DirectResults, DirectSearch};
use super::runtime_helpers::{Branch, fallback_task};
use super::stats::{SearchStats, SearchStatsSnapshot};
use super::types::{SearchOutcome, SearchSource};
use crate::config::AcquireConfig;
use crate::repository::{
    AggregationEndpoint, ContentRepository, HttpBackend, PostgrestRepository, Query, RegionKey,
    RegionResolver, RemoteAggregator, ResultSet, TranslationIndex,
};
use crate::utils::{SEARCH_PAGE_SIZE, normalize_query};

/// Search coordinator combining the remote and direct paths
pub struct SearchAggregator {
    remote: Option<Arc<dyn AggregationEndpoint>>,
    direct: DirectSearch,
    regions: Arc<dyn RegionResolver>,
    stats: Arc<SearchStats>,
}

impl std::fmt::Debug for SearchAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchAggregator")
            .field("remote", &self.remote.is_some())
            .field("direct", &self.direct)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

impl SearchAggregator {
    /// Assemble an aggregator from its collaborators.
    ///
    /// Without a remote endpoint every search takes the direct path.
    pub fn new(
        remote: Option<Arc<dyn AggregationEndpoint>>,
        index: Arc<dyn TranslationIndex>,
        content: Arc<dyn ContentRepository>,
        regions: Arc<dyn RegionResolver>,
    ) -> Self {
        Self {
            remote,
            direct: DirectSearch::new(index, content, SEARCH_PAGE_SIZE),
            regions,
            stats: Arc::new(SearchStats::new()),
        }
    }

    /// Use a single backend for every seam
    pub fn from_repository<R>(repository: Arc<R>, use_remote: bool) -> Self
    where
        R: AggregationEndpoint + TranslationIndex + ContentRepository + RegionResolver + 'static,
    {
        let remote: Option<Arc<dyn AggregationEndpoint>> = if use_remote {
            Some(repository.clone() as Arc<dyn AggregationEndpoint>)
        } else {
            None
        };
        Self::new(remote, repository.clone(), repository.clone(), repository)
    }

    /// Build the HTTP-backed aggregator described by `config`
    pub fn from_config(config: &AcquireConfig) -> Result<Self> {
        let backend = HttpBackend::from_config(config)?;

        let remote: Option<Arc<dyn AggregationEndpoint>> = if config.remote_search_enabled() {
            Some(Arc::new(RemoteAggregator::new(
                backend.clone(),
                config.search_function(),
            )) as Arc<dyn AggregationEndpoint>)
        } else {
            None
        };
        let tables = Arc::new(PostgrestRepository::new(backend, config.schema().clone()));

        Ok(
            Self::new(remote, tables.clone(), tables.clone(), tables)
                .with_page_size(config.search_page_size()),
        )
    }

    /// Cap per collection on the direct path
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        let (index, content) = self.direct.collaborators();
        self.direct = DirectSearch::new(index, content, page_size);
        self
    }

    #[must_use]
    pub fn direct(&self) -> &DirectSearch {
        &self.direct
    }

    #[must_use]
    pub fn stats(&self) -> SearchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Resolve `query` into a result set. Never fails.
    pub async fn search(&self, query: &Query) -> ResultSet {
        self.search_detailed(query).await.results
    }

    /// Like [`search`](Self::search), also reporting which path answered
    /// and which collections degraded.
    pub async fn search_detailed(&self, query: &Query) -> SearchOutcome {
        let Some(text) = normalize_query(&query.text) else {
            SearchStats::record(&self.stats.empty_queries);
            debug!("Empty query, skipping search");
            return SearchOutcome::empty();
        };
        SearchStats::record(&self.stats.searches);

        let region = self.resolve_region(query.region.as_deref()).await;
        let locale = query.locale;
        info!(query = %text, region = ?region, locale = %locale, "Searching");

        let run_direct = || async { self.direct.run(&text, region.as_ref(), locale).await };

        let (direct, source) = match &self.remote {
            Some(remote) => {
                let (direct, branch) = fallback_task(
                    || async {
                        remote
                            .aggregate(&text, region.as_ref(), locale)
                            .await
                            .map(|results| DirectResults {
                                results,
                                degraded: Vec::new(),
                            })
                    },
                    run_direct,
                )
                .await;
                match branch {
                    Branch::Primary => (direct, SearchSource::Remote),
                    Branch::Fallback => (direct, SearchSource::Fallback),
                }
            }
            None => (run_direct().await, SearchSource::Fallback),
        };

        match source {
            SearchSource::Remote => SearchStats::record(&self.stats.remote_successes),
            _ => SearchStats::record(&self.stats.fallbacks),
        }
        for _ in &direct.degraded {
            SearchStats::record(&self.stats.degraded_collections);
        }
        if !direct.degraded.is_empty() {
            warn!(
                query = %text,
                degraded = ?direct.degraded,
                "Search completed with degraded collections"
            );
        }

        info!(
            query = %text,
            source = ?source,
            total = direct.results.total(),
            "Search completed"
        );

        SearchOutcome {
            results: direct.results,
            source,
            region,
            degraded: direct.degraded,
        }
    }

    /// Unknown or unresolvable regions degrade to an unscoped search
    async fn resolve_region(&self, value: Option<&str>) -> Option<RegionKey> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        let resolved = self.regions.resolve_region(value).await;
        if resolved.is_none() {
            SearchStats::record(&self.stats.unresolved_regions);
            debug!(region = value, "Region not found, searching unscoped");
        }
        resolved
    }
}
