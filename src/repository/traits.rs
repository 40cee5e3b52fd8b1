use async_trait::async_trait;

use super::errors::RepositoryResult;
use super::types::{Entity, EntityType, FilterSet, Locale, RegionKey, ResultSet, TranslationMatch};

/// Remote endpoint that runs the whole federated search server-side
#[async_trait]
pub trait AggregationEndpoint: Send + Sync {
    /// One round trip; any error sends the caller to the direct path.
    async fn aggregate(
        &self,
        text: &str,
        region: Option<&RegionKey>,
        locale: Locale,
    ) -> RepositoryResult<ResultSet>;
}

/// Secondary per-locale text index for stores and deals
#[async_trait]
pub trait TranslationIndex: Send + Sync {
    /// Rows of `entity_type` whose indexed text contains `text`
    /// (case-insensitive). Rows may repeat an entity id. The index is not
    /// region-partitioned.
    async fn lookup(
        &self,
        entity_type: EntityType,
        text: &str,
    ) -> RepositoryResult<Vec<TranslationMatch>>;
}

/// Direct access to the content tables
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Hydrate entities by id, keeping only those in `region` when given.
    async fn fetch_by_ids(
        &self,
        entity_type: EntityType,
        ids: &[String],
        region: Option<&RegionKey>,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>>;

    /// Substring match against the entity's own localized text columns.
    async fn search_text_columns(
        &self,
        entity_type: EntityType,
        text: &str,
        region: Option<&RegionKey>,
        locale: Locale,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>>;

    /// One page of a filtered listing.
    /// Returns an empty page, not an error, when `offset` is past the end.
    async fn list_page(
        &self,
        entity_type: EntityType,
        filters: &FilterSet,
        offset: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>>;
}

/// Maps user-facing region values to internal keys
#[async_trait]
pub trait RegionResolver: Send + Sync {
    /// Never fails: lookup errors and unknown values both yield `None`.
    async fn resolve_region(&self, value: &str) -> Option<RegionKey>;
}
