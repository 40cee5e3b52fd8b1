//! Listing message types, updates and options

use serde::Serialize;
use tokio::sync::oneshot;

use crate::config::AcquireConfig;
use crate::events::CoreEventBus;
use crate::repository::{Entity, EntityType, ErrorKind, FilterSet, RepositoryResult};
use crate::utils::LISTING_PAGE_SIZE;

/// Fetch state of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingState {
    Idle,
    Loading,
}

/// Commands accepted by the listing worker
#[derive(Debug)]
pub(crate) enum ListingMessage {
    RequestNextPage,
    ResetAndLoad(FilterSet),
    Snapshot(oneshot::Sender<ListingSnapshot>),
    Shutdown,
}

/// Result of a spawned page fetch, routed back to the worker
#[derive(Debug)]
pub(crate) struct PageCompletion {
    pub generation: u64,
    pub offset: usize,
    pub result: RepositoryResult<Vec<Entity>>,
}

/// A page fetch the cursor has authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub offset: usize,
    pub limit: usize,
    pub filters: FilterSet,
}

/// Updates emitted after each settled fetch
#[derive(Debug, Clone)]
pub enum ListingUpdate {
    /// Newly appended items (duplicates already removed)
    PageAppended {
        generation: u64,
        items: Vec<Entity>,
        has_more: bool,
    },
    /// Items were cleared for new filters; the first page is loading
    Reset { generation: u64, filters: FilterSet },
    /// The fetch failed. Loaded items are kept and `has_more` is now false.
    Failed {
        generation: u64,
        kind: ErrorKind,
        message: String,
    },
}

/// Point-in-time copy of a listing's state
#[derive(Debug, Clone, Serialize)]
pub struct ListingSnapshot {
    pub items: Vec<Entity>,
    pub offset: usize,
    pub page_size: usize,
    pub has_more: bool,
    pub state: ListingState,
    pub generation: u64,
    pub filters: FilterSet,
}

impl ListingSnapshot {
    /// Ids of the loaded items, in display order
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(Entity::id).collect()
    }
}

/// Parameters for starting a listing worker
#[derive(Debug, Clone)]
pub struct ListingOptions {
    pub entity_type: EntityType,
    pub filters: FilterSet,
    pub page_size: usize,
    pub events: Option<CoreEventBus>,
}

impl ListingOptions {
    #[must_use]
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            filters: FilterSet::default(),
            page_size: LISTING_PAGE_SIZE,
            events: None,
        }
    }

    /// Options using the configured listing page size
    #[must_use]
    pub fn from_config(config: &AcquireConfig, entity_type: EntityType) -> Self {
        Self::new(entity_type).with_page_size(config.listing_page_size())
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_events(mut self, bus: CoreEventBus) -> Self {
        self.events = Some(bus);
        self
    }
}
