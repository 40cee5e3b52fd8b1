//! Direct query path against the backend's REST table API
//!
//! Every request is built from the [`RepositorySchema`] descriptor using
//! PostgREST filter syntax. Text matching is a case-insensitive substring
//! match (`ilike`) across the configured columns.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use super::errors::{RepositoryError, RepositoryResult};
use super::http::HttpBackend;
use super::schema::RepositorySchema;
use super::traits::{ContentRepository, RegionResolver, TranslationIndex};
use super::types::{Entity, EntityType, FilterSet, Locale, RegionKey, TranslationMatch};
use crate::utils::{escape_like, quote_filter_value};

/// Most translation rows read for one lookup
const INDEX_LOOKUP_LIMIT: usize = 500;

/// Repository adapter that queries the content tables directly
#[derive(Debug, Clone)]
pub struct PostgrestRepository {
    backend: HttpBackend,
    schema: Arc<RepositorySchema>,
}

/// Build an `or=(...)` group matching `text` in any of `columns`
fn ilike_any(columns: &[String], text: &str) -> String {
    let pattern = quote_filter_value(&format!("*{}*", escape_like(text)));
    let clauses = columns
        .iter()
        .map(|column| format!("{column}.ilike.{pattern}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("({clauses})")
}

/// Read a key-like column as a string; numbers are normalized
fn key_field(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl PostgrestRepository {
    pub fn new(backend: HttpBackend, schema: RepositorySchema) -> Self {
        Self {
            backend,
            schema: Arc::new(schema),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &RepositorySchema {
        &self.schema
    }

    fn region_filter(&self, url: &mut Url, region: Option<&RegionKey>) {
        if let Some(region) = region {
            url.query_pairs_mut()
                .append_pair(&self.schema.region_column, &format!("eq.{region}"));
        }
    }

    async fn fetch_rows(&self, table: &str, url: Url) -> RepositoryResult<Vec<Value>> {
        log::debug!("Direct query: {url}");
        self.backend.send_json(table, self.backend.get(url)).await
    }

    async fn fetch_entities(&self, table: &str, url: Url) -> RepositoryResult<Vec<Entity>> {
        let rows = self.fetch_rows(table, url).await?;
        Entity::from_values(rows).map_err(|e| match e {
            RepositoryError::MalformedResponse { message, .. } => {
                RepositoryError::malformed(table, message)
            }
            other => other,
        })
    }
}

#[async_trait]
impl TranslationIndex for PostgrestRepository {
    async fn lookup(
        &self,
        entity_type: EntityType,
        text: &str,
    ) -> RepositoryResult<Vec<TranslationMatch>> {
        let schema = &self.schema;
        let table = schema.translations_table.as_str();
        let mut url = self.backend.table_url(table)?;
        url.query_pairs_mut()
            .append_pair(
                "select",
                &format!(
                    "{},{}",
                    schema.translation_type_column, schema.translation_id_column
                ),
            )
            .append_pair(
                &schema.translation_type_column,
                &format!("eq.{entity_type}"),
            )
            .append_pair("or", &ilike_any(&schema.translation_text_columns, text))
            .append_pair("limit", &INDEX_LOOKUP_LIMIT.to_string());

        let rows = self.fetch_rows(table, url).await?;
        rows.iter()
            .map(|row| {
                key_field(row, &schema.translation_id_column)
                    .map(|entity_id| TranslationMatch {
                        entity_type,
                        entity_id,
                    })
                    .ok_or_else(|| {
                        RepositoryError::malformed(table, "translation row without entity id")
                    })
            })
            .collect()
    }
}

#[async_trait]
impl ContentRepository for PostgrestRepository {
    async fn fetch_by_ids(
        &self,
        entity_type: EntityType,
        ids: &[String],
        region: Option<&RegionKey>,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let table = self.schema.table(entity_type);
        let id_list = ids
            .iter()
            .map(|id| quote_filter_value(id))
            .collect::<Vec<_>>()
            .join(",");

        let mut url = self.backend.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("in.({id_list})"));
        self.region_filter(&mut url, region);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        self.fetch_entities(table, url).await
    }

    async fn search_text_columns(
        &self,
        entity_type: EntityType,
        text: &str,
        region: Option<&RegionKey>,
        locale: Locale,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>> {
        let columns = self.schema.text_columns(entity_type, locale).ok_or_else(|| {
            RepositoryError::Unsupported(format!("direct text search on {entity_type}"))
        })?;

        let table = self.schema.table(entity_type);
        let mut url = self.backend.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("or", &ilike_any(&columns, text));
        self.region_filter(&mut url, region);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        self.fetch_entities(table, url).await
    }

    async fn list_page(
        &self,
        entity_type: EntityType,
        filters: &FilterSet,
        offset: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>> {
        let table = self.schema.table(entity_type);
        let mut url = self.backend.table_url(table)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            for (field, value) in &filters.equals {
                pairs.append_pair(field, &format!("eq.{value}"));
            }
        }
        self.region_filter(&mut url, filters.region.as_ref());
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(order) = &filters.order {
                let direction = if order.descending { "desc" } else { "asc" };
                pairs.append_pair("order", &format!("{}.{direction}", order.field));
            }
            pairs
                .append_pair("offset", &offset.to_string())
                .append_pair("limit", &limit.to_string());
        }

        self.fetch_entities(table, url).await
    }
}

#[async_trait]
impl RegionResolver for PostgrestRepository {
    async fn resolve_region(&self, value: &str) -> Option<RegionKey> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        let schema = &self.schema;
        let table = schema.regions_table.as_str();
        let mut url = match self.backend.table_url(table) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Region lookup skipped: {e}");
                return None;
            }
        };

        let quoted = quote_filter_value(value);
        let any_column = schema
            .region_lookup_columns
            .iter()
            .map(|column| format!("{column}.eq.{quoted}"))
            .collect::<Vec<_>>()
            .join(",");
        url.query_pairs_mut()
            .append_pair("select", &schema.region_key_column)
            .append_pair("or", &format!("({any_column})"))
            .append_pair("limit", "1");

        match self.fetch_rows(table, url).await {
            Ok(rows) => {
                let key = rows
                    .first()
                    .and_then(|row| key_field(row, &schema.region_key_column))
                    .map(RegionKey::new);
                if key.is_none() {
                    log::debug!("{}", RepositoryError::RegionNotFound(value.to_string()));
                }
                key
            }
            Err(e) => {
                log::debug!("Region lookup for '{value}' failed, continuing unscoped: {e}");
                None
            }
        }
    }
}
