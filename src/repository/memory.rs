//! In-process repository
//!
//! Implements every repository trait over in-memory collections, including an
//! emulation of the remote aggregation endpoint. Failures can be injected per
//! collection and for the remote endpoint, and every call is counted, which
//! makes it the backing store for demos and coordinator tests.

use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::errors::{RepositoryError, RepositoryResult};
use super::schema::RepositorySchema;
use super::traits::{AggregationEndpoint, ContentRepository, RegionResolver, TranslationIndex};
use super::types::{
    Entity, EntityType, FilterSet, Locale, RegionKey, ResultSet, TranslationMatch,
};
use crate::utils::{SEARCH_PAGE_SIZE, contains_ci};

/// How the emulated remote endpoint answers
#[derive(Debug, Clone)]
pub enum RemoteMode {
    /// Run the search server-side over the stored data, products included
    Emulate,
    /// Always answer with this result set
    Fixed(ResultSet),
    /// Always fail with this error
    Fail(RepositoryError),
}

#[derive(Debug, Clone)]
struct TranslationRow {
    entity_type: EntityType,
    entity_id: String,
    text: String,
}

/// Per-operation call counters
#[derive(Debug, Default)]
struct CallCounters {
    aggregate: AtomicUsize,
    lookup: AtomicUsize,
    fetch_by_ids: AtomicUsize,
    search_text_columns: AtomicUsize,
    list_page: AtomicUsize,
    resolve_region: AtomicUsize,
}

/// Snapshot of how often each repository operation was called
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub aggregate: usize,
    pub lookup: usize,
    pub fetch_by_ids: usize,
    pub search_text_columns: usize,
    pub list_page: usize,
    pub resolve_region: usize,
}

impl CallCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.aggregate
            + self.lookup
            + self.fetch_by_ids
            + self.search_text_columns
            + self.list_page
            + self.resolve_region
    }
}

pub struct InMemoryRepository {
    schema: RepositorySchema,
    entities: RwLock<AHashMap<EntityType, Vec<Entity>>>,
    translations: RwLock<Vec<TranslationRow>>,
    regions: RwLock<AHashMap<String, RegionKey>>,
    remote: RwLock<RemoteMode>,
    failing: RwLock<AHashMap<EntityType, RepositoryError>>,
    calls: CallCounters,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::with_schema(RepositorySchema::default())
    }

    #[must_use]
    pub fn with_schema(schema: RepositorySchema) -> Self {
        Self {
            schema,
            entities: RwLock::new(AHashMap::new()),
            translations: RwLock::new(Vec::new()),
            regions: RwLock::new(AHashMap::new()),
            remote: RwLock::new(RemoteMode::Emulate),
            failing: RwLock::new(AHashMap::new()),
            calls: CallCounters::default(),
        }
    }

    /// Store a record; it must be a JSON object with an `id`
    pub fn insert(&self, entity_type: EntityType, record: Value) -> RepositoryResult<()> {
        let entity = Entity::from_value(record)?;
        self.entities
            .write()
            .entry(entity_type)
            .or_default()
            .push(entity);
        Ok(())
    }

    /// Add a translation index row for a store or deal
    pub fn add_translation(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.translations.write().push(TranslationRow {
            entity_type,
            entity_id: entity_id.into(),
            text: text.into(),
        });
    }

    /// Register a user-facing region value (matched case-insensitively)
    pub fn add_region(&self, value: &str, key: RegionKey) {
        self.regions.write().insert(value.to_lowercase(), key);
    }

    pub fn set_remote_mode(&self, mode: RemoteMode) {
        *self.remote.write() = mode;
    }

    /// Make every direct operation on `entity_type` fail with `error`
    pub fn fail_collection(&self, entity_type: EntityType, error: RepositoryError) {
        self.failing.write().insert(entity_type, error);
    }

    pub fn heal_collection(&self, entity_type: EntityType) {
        self.failing.write().remove(&entity_type);
    }

    #[must_use]
    pub fn count(&self, entity_type: EntityType) -> usize {
        self.entities
            .read()
            .get(&entity_type)
            .map_or(0, Vec::len)
    }

    #[must_use]
    pub fn calls(&self) -> CallCounts {
        let c = &self.calls;
        CallCounts {
            aggregate: c.aggregate.load(Ordering::Relaxed),
            lookup: c.lookup.load(Ordering::Relaxed),
            fetch_by_ids: c.fetch_by_ids.load(Ordering::Relaxed),
            search_text_columns: c.search_text_columns.load(Ordering::Relaxed),
            list_page: c.list_page.load(Ordering::Relaxed),
            resolve_region: c.resolve_region.load(Ordering::Relaxed),
        }
    }

    fn check_failure(&self, entity_type: EntityType) -> RepositoryResult<()> {
        match self.failing.read().get(&entity_type) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn in_region(&self, entity: &Entity, region: Option<&RegionKey>) -> bool {
        FilterSet {
            region: region.cloned(),
            ..FilterSet::default()
        }
        .matches(entity, &self.schema.region_column)
    }

    fn any_field_contains(entity: &Entity, fields: &[String], text: &str) -> bool {
        fields.iter().any(|field| {
            matches!(entity.get(field), Some(Value::String(s)) if contains_ci(s, text))
        })
    }

    /// Server-side search used by [`RemoteMode::Emulate`]
    fn emulate_aggregate(
        &self,
        text: &str,
        region: Option<&RegionKey>,
        locale: Locale,
    ) -> ResultSet {
        let indexed = |entity_type: EntityType| -> Vec<Entity> {
            let ids: AHashSet<String> = self
                .translations
                .read()
                .iter()
                .filter(|row| row.entity_type == entity_type && contains_ci(&row.text, text))
                .map(|row| row.entity_id.clone())
                .collect();
            self.entities
                .read()
                .get(&entity_type)
                .map(|all| {
                    all.iter()
                        .filter(|e| ids.contains(e.id()) && self.in_region(e, region))
                        .take(SEARCH_PAGE_SIZE)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        let by_columns = |entity_type: EntityType, columns: &[String]| -> Vec<Entity> {
            self.entities
                .read()
                .get(&entity_type)
                .map(|all| {
                    all.iter()
                        .filter(|e| {
                            self.in_region(e, region) && Self::any_field_contains(e, columns, text)
                        })
                        .take(SEARCH_PAGE_SIZE)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        let product_columns = vec!["name".to_string(), "description".to_string()];
        let article_columns = self
            .schema
            .text_columns(EntityType::Article, locale)
            .unwrap_or_default();

        ResultSet::new(
            indexed(EntityType::Store),
            indexed(EntityType::Deal),
            by_columns(EntityType::Product, &product_columns),
            by_columns(EntityType::Article, &article_columns),
        )
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Order two JSON values for listing sorts: numbers numerically, everything
/// else by its string form, missing values last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    }
}

#[async_trait]
impl AggregationEndpoint for InMemoryRepository {
    async fn aggregate(
        &self,
        text: &str,
        region: Option<&RegionKey>,
        locale: Locale,
    ) -> RepositoryResult<ResultSet> {
        self.calls.aggregate.fetch_add(1, Ordering::Relaxed);
        let mode = self.remote.read().clone();
        match mode {
            RemoteMode::Emulate => Ok(self.emulate_aggregate(text, region, locale)),
            RemoteMode::Fixed(results) => Ok(results),
            RemoteMode::Fail(error) => Err(error),
        }
    }
}

#[async_trait]
impl TranslationIndex for InMemoryRepository {
    async fn lookup(
        &self,
        entity_type: EntityType,
        text: &str,
    ) -> RepositoryResult<Vec<TranslationMatch>> {
        self.calls.lookup.fetch_add(1, Ordering::Relaxed);
        self.check_failure(entity_type)?;

        Ok(self
            .translations
            .read()
            .iter()
            .filter(|row| row.entity_type == entity_type && contains_ci(&row.text, text))
            .map(|row| TranslationMatch {
                entity_type,
                entity_id: row.entity_id.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn fetch_by_ids(
        &self,
        entity_type: EntityType,
        ids: &[String],
        region: Option<&RegionKey>,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>> {
        self.calls.fetch_by_ids.fetch_add(1, Ordering::Relaxed);
        self.check_failure(entity_type)?;

        let wanted: AHashSet<&str> = ids.iter().map(String::as_str).collect();
        Ok(self
            .entities
            .read()
            .get(&entity_type)
            .map(|all| {
                all.iter()
                    .filter(|e| wanted.contains(e.id()) && self.in_region(e, region))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn search_text_columns(
        &self,
        entity_type: EntityType,
        text: &str,
        region: Option<&RegionKey>,
        locale: Locale,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>> {
        self.calls.search_text_columns.fetch_add(1, Ordering::Relaxed);
        self.check_failure(entity_type)?;

        let columns = self.schema.text_columns(entity_type, locale).ok_or_else(|| {
            RepositoryError::Unsupported(format!("direct text search on {entity_type}"))
        })?;

        Ok(self
            .entities
            .read()
            .get(&entity_type)
            .map(|all| {
                all.iter()
                    .filter(|e| {
                        self.in_region(e, region) && Self::any_field_contains(e, &columns, text)
                    })
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_page(
        &self,
        entity_type: EntityType,
        filters: &FilterSet,
        offset: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>> {
        self.calls.list_page.fetch_add(1, Ordering::Relaxed);
        self.check_failure(entity_type)?;

        let mut matching: Vec<Entity> = self
            .entities
            .read()
            .get(&entity_type)
            .map(|all| {
                all.iter()
                    .filter(|e| filters.matches(e, &self.schema.region_column))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &filters.order {
            matching.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.field), b.get(&order.field));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }
}

#[async_trait]
impl RegionResolver for InMemoryRepository {
    async fn resolve_region(&self, value: &str) -> Option<RegionKey> {
        self.calls.resolve_region.fetch_add(1, Ordering::Relaxed);
        self.regions.read().get(&value.trim().to_lowercase()).cloned()
    }
}
