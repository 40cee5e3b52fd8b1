//! Direct search path
//!
//! Runs the federated search against the content tables when the remote
//! aggregation endpoint is unavailable. Stores and deals are matched through
//! the translation index and hydrated by id; guides are matched on their own
//! localized columns; products are never searched here.

use ahash::AHashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::repository::{
    ContentRepository, Entity, EntityType, Locale, RegionKey, RepositoryError, RepositoryResult,
    ResultSet, TranslationIndex, TranslationMatch,
};

/// Most ids sent in one hydration request
pub const HYDRATION_CHUNK: usize = 100;

/// Result of a direct search: the merged set plus the collections that
/// failed and were left empty.
#[derive(Debug, Clone, Default)]
pub struct DirectResults {
    pub results: ResultSet,
    pub degraded: Vec<EntityType>,
}

/// Per-collection text search over the content tables
#[derive(Clone)]
pub struct DirectSearch {
    index: Arc<dyn TranslationIndex>,
    content: Arc<dyn ContentRepository>,
    page_size: usize,
}

impl std::fmt::Debug for DirectSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectSearch")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl DirectSearch {
    pub fn new(
        index: Arc<dyn TranslationIndex>,
        content: Arc<dyn ContentRepository>,
        page_size: usize,
    ) -> Self {
        Self {
            index,
            content,
            page_size: page_size.max(1),
        }
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub(crate) fn collaborators(&self) -> (Arc<dyn TranslationIndex>, Arc<dyn ContentRepository>) {
        (self.index.clone(), self.content.clone())
    }

    /// Text search over a single collection.
    ///
    /// `region` is applied at hydration for stores and deals and inside the
    /// query for guides. Products are rejected with
    /// [`RepositoryError::Unsupported`].
    pub async fn find_by_text(
        &self,
        entity_type: EntityType,
        text: &str,
        region: Option<&RegionKey>,
        locale: Locale,
    ) -> RepositoryResult<Vec<Entity>> {
        match entity_type {
            EntityType::Store | EntityType::Deal => {
                self.find_via_index(entity_type, text, region).await
            }
            EntityType::Article => {
                self.content
                    .search_text_columns(entity_type, text, region, locale, self.page_size)
                    .await
            }
            EntityType::Product => Err(RepositoryError::Unsupported(
                "text search over products".to_string(),
            )),
        }
    }

    async fn find_via_index(
        &self,
        entity_type: EntityType,
        text: &str,
        region: Option<&RegionKey>,
    ) -> RepositoryResult<Vec<Entity>> {
        let matches = self.index.lookup(entity_type, text).await?;
        let ids = distinct_ids(entity_type, &matches);
        debug!(
            entity_type = %entity_type,
            rows = matches.len(),
            ids = ids.len(),
            "Translation index lookup"
        );

        // Ids go out in bounded chunks, in first-seen order, until a page
        // of in-region entities has been collected.
        let mut entities = Vec::with_capacity(self.page_size);
        for chunk in ids.chunks(HYDRATION_CHUNK) {
            let remaining = self.page_size - entities.len();
            let mut found = self
                .content
                .fetch_by_ids(entity_type, chunk, region, remaining)
                .await?;
            found.truncate(remaining);
            entities.extend(found);
            if entities.len() >= self.page_size {
                break;
            }
        }
        Ok(entities)
    }

    /// Search stores, deals and guides concurrently and merge.
    ///
    /// A failing collection is logged and returned empty; the others are
    /// unaffected. `products` is always empty.
    pub async fn run(&self, text: &str, region: Option<&RegionKey>, locale: Locale) -> DirectResults {
        let (stores, deals, guides) = tokio::join!(
            self.find_by_text(EntityType::Store, text, region, locale),
            self.find_by_text(EntityType::Deal, text, region, locale),
            self.find_by_text(EntityType::Article, text, region, locale),
        );

        let mut degraded = Vec::new();
        let stores = settle(EntityType::Store, stores, &mut degraded);
        let deals = settle(EntityType::Deal, deals, &mut degraded);
        let guides = settle(EntityType::Article, guides, &mut degraded);

        DirectResults {
            results: ResultSet::new(stores, deals, Vec::new(), guides),
            degraded,
        }
    }
}

/// Ids of `entity_type` in first-seen order, without repeats
fn distinct_ids(entity_type: EntityType, matches: &[TranslationMatch]) -> Vec<String> {
    let mut seen = AHashSet::with_capacity(matches.len());
    matches
        .iter()
        .filter(|m| m.entity_type == entity_type)
        .filter(|m| seen.insert(m.entity_id.as_str()))
        .map(|m| m.entity_id.clone())
        .collect()
}

fn settle(
    entity_type: EntityType,
    result: RepositoryResult<Vec<Entity>>,
    degraded: &mut Vec<EntityType>,
) -> Vec<Entity> {
    match result {
        Ok(entities) => entities,
        Err(e) => {
            warn!(
                entity_type = %entity_type,
                error = %e,
                "Collection search failed, returning it empty"
            );
            degraded.push(entity_type);
            Vec::new()
        }
    }
}
