//! Explicit description of the backend tables the direct path queries
//!
//! The descriptor is resolved once from configuration. Adapters build every
//! query from it instead of discovering columns at request time.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use super::types::{EntityType, Locale};

/// Table and column names used by the direct query path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySchema {
    pub stores_table: String,
    pub deals_table: String,
    pub products_table: String,
    pub articles_table: String,

    /// Translation index table and its columns
    pub translations_table: String,
    pub translation_type_column: String,
    pub translation_id_column: String,
    pub translation_text_columns: Vec<String>,

    /// Base names of the article text columns; the locale is appended as a
    /// suffix (`title` becomes `title_en` / `title_ar`)
    pub article_text_columns: Vec<String>,

    /// Column every regional entity table uses for its region key
    pub region_column: String,

    pub regions_table: String,
    /// Columns a user-facing region value may match, tried together
    pub region_lookup_columns: Vec<String>,
    /// Column holding the internal key returned by region resolution
    pub region_key_column: String,
}

impl Default for RepositorySchema {
    fn default() -> Self {
        Self {
            stores_table: "stores".to_string(),
            deals_table: "deals".to_string(),
            products_table: "products".to_string(),
            articles_table: "articles".to_string(),
            translations_table: "translations".to_string(),
            translation_type_column: "entity_type".to_string(),
            translation_id_column: "entity_id".to_string(),
            translation_text_columns: vec!["name".to_string(), "description".to_string()],
            article_text_columns: vec![
                "title".to_string(),
                "excerpt".to_string(),
                "content".to_string(),
            ],
            region_column: "region_id".to_string(),
            regions_table: "regions".to_string(),
            region_lookup_columns: vec!["code".to_string(), "slug".to_string()],
            region_key_column: "id".to_string(),
        }
    }
}

impl RepositorySchema {
    #[must_use]
    pub fn table(&self, entity_type: EntityType) -> &str {
        match entity_type {
            EntityType::Store => &self.stores_table,
            EntityType::Deal => &self.deals_table,
            EntityType::Product => &self.products_table,
            EntityType::Article => &self.articles_table,
        }
    }

    /// Localized text columns searched directly for an entity type.
    ///
    /// Only articles carry their text on the row; stores and deals go
    /// through the translation index and products are not searched.
    #[must_use]
    pub fn text_columns(&self, entity_type: EntityType, locale: Locale) -> Option<Vec<String>> {
        match entity_type {
            EntityType::Article => Some(
                self.article_text_columns
                    .iter()
                    .map(|column| format!("{column}_{locale}"))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Reject descriptors that cannot produce valid queries
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("stores_table", &self.stores_table),
            ("deals_table", &self.deals_table),
            ("products_table", &self.products_table),
            ("articles_table", &self.articles_table),
            ("translations_table", &self.translations_table),
            ("translation_type_column", &self.translation_type_column),
            ("translation_id_column", &self.translation_id_column),
            ("region_column", &self.region_column),
            ("regions_table", &self.regions_table),
            ("region_key_column", &self.region_key_column),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(anyhow!("Repository schema field '{field}' must not be empty"));
            }
        }

        if self.translation_text_columns.is_empty() {
            return Err(anyhow!("At least one translation text column is required"));
        }
        if self.article_text_columns.is_empty() {
            return Err(anyhow!("At least one article text column is required"));
        }
        if self.region_lookup_columns.is_empty() {
            return Err(anyhow!("At least one region lookup column is required"));
        }

        Ok(())
    }
}
