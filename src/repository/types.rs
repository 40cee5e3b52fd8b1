//! Core data types shared by the repository adapters and the coordinators
//!
//! Entities are opaque JSON records: the only field the core reads is `id`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::errors::RepositoryError;

/// Interface language of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content collections the marketplace exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Store,
    Deal,
    Product,
    /// Guides are stored as articles
    Article,
}

impl EntityType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Store => "store",
            EntityType::Deal => "deal",
            EntityType::Product => "product",
            EntityType::Article => "article",
        }
    }

    /// Whether free text for this type lives in the translation index
    /// rather than on the entity row.
    #[must_use]
    pub fn uses_translation_index(self) -> bool {
        matches!(self, EntityType::Store | EntityType::Deal)
    }

    /// Whether this type supports incremental filtered listings
    #[must_use]
    pub fn is_listable(self) -> bool {
        matches!(self, EntityType::Product | EntityType::Article)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque content record keyed by `id`
///
/// Numeric ids are normalized to their decimal string form so that ids
/// coming from different adapters compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Entity {
    id: String,
    record: Map<String, Value>,
}

impl Entity {
    /// Build an entity from a JSON object, extracting its id
    pub fn from_value(value: Value) -> Result<Self, RepositoryError> {
        let Value::Object(record) = value else {
            return Err(RepositoryError::malformed("entity", "record is not a JSON object"));
        };

        let id = match record.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                return Err(RepositoryError::malformed(
                    "entity",
                    "record id is not a string or number",
                ));
            }
            None => return Err(RepositoryError::malformed("entity", "record has no id")),
        };

        Ok(Self { id, record })
    }

    /// Build a list of entities, failing on the first malformed record
    pub fn from_values(values: Vec<Value>) -> Result<Vec<Self>, RepositoryError> {
        values.into_iter().map(Self::from_value).collect()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw field access, for adapters and presentation code
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    #[must_use]
    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }
}

impl TryFrom<Value> for Entity {
    type Error = RepositoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Object(entity.record)
    }
}

/// Internal key a user-facing region value resolves to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionKey(String);

impl RegionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the translation index that matched a search term
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranslationMatch {
    pub entity_type: EntityType,
    pub entity_id: String,
}

/// Sort direction for listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub descending: bool,
}

/// Filters applied to a listing
///
/// `region` holds the internal region key; equality filters are matched
/// exactly against entity columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub equals: BTreeMap<String, String>,
    pub region: Option<RegionKey>,
    pub order: Option<SortOrder>,
}

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: RegionKey) -> Self {
        self.region = Some(region);
        self
    }

    #[must_use]
    pub fn ordered_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order = Some(SortOrder {
            field: field.into(),
            descending,
        });
        self
    }

    /// Whether an entity satisfies the equality and region filters.
    ///
    /// Used by in-process repositories; remote adapters push filters into
    /// the query instead.
    #[must_use]
    pub fn matches(&self, entity: &Entity, region_field: &str) -> bool {
        let field_matches = |field: &str, expected: &str| match entity.get(field) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Number(n)) => n.to_string() == expected,
            Some(Value::Bool(b)) => b.to_string() == expected,
            _ => false,
        };

        self.equals
            .iter()
            .all(|(field, expected)| field_matches(field, expected))
            && self
                .region
                .as_ref()
                .is_none_or(|region| field_matches(region_field, region.as_str()))
    }
}

/// A single free-text search invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    /// User-facing region value, resolved to a [`RegionKey`] before use
    pub region: Option<String>,
    pub locale: Locale,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            region: None,
            locale: Locale::default(),
        }
    }

    #[must_use]
    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

/// Merged search results across the four collections
///
/// `total` is always derived from the collections, never supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    stores: Vec<Entity>,
    deals: Vec<Entity>,
    products: Vec<Entity>,
    guides: Vec<Entity>,
    total: usize,
}

impl ResultSet {
    #[must_use]
    pub fn new(
        stores: Vec<Entity>,
        deals: Vec<Entity>,
        products: Vec<Entity>,
        guides: Vec<Entity>,
    ) -> Self {
        let total = stores.len() + deals.len() + products.len() + guides.len();
        Self {
            stores,
            deals,
            products,
            guides,
            total,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stores(&self) -> &[Entity] {
        &self.stores
    }

    #[must_use]
    pub fn deals(&self) -> &[Entity] {
        &self.deals
    }

    #[must_use]
    pub fn products(&self) -> &[Entity] {
        &self.products
    }

    #[must_use]
    pub fn guides(&self) -> &[Entity] {
        &self.guides
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Collection for an entity type
    #[must_use]
    pub fn collection(&self, entity_type: EntityType) -> &[Entity] {
        match entity_type {
            EntityType::Store => &self.stores,
            EntityType::Deal => &self.deals,
            EntityType::Product => &self.products,
            EntityType::Article => &self.guides,
        }
    }
}
