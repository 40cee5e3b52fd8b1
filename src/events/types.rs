//! Event types published to the presentation layer
//!
//! These are the outputs of the core: result sets for search sessions, page
//! appends and resets for listings, and advisory errors.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::repository::{Entity, EntityType, ErrorKind, FilterSet, Query, ResultSet};
use crate::search::SearchSource;

/// Event types emitted by the coordinators
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreEvent {
    /// A search session applied a new result set (`onResultSet`)
    ResultSetReady {
        sequence: u64,
        query: Query,
        results: ResultSet,
        source: SearchSource,
        timestamp: DateTime<Utc>,
    },
    /// A listing appended a settled page (`onPageAppended`)
    PageAppended {
        listing_id: Uuid,
        entity_type: EntityType,
        generation: u64,
        items: Vec<Entity>,
        has_more: bool,
        timestamp: DateTime<Utc>,
    },
    /// A listing discarded its items and started over with new filters
    ListingReset {
        listing_id: Uuid,
        entity_type: EntityType,
        generation: u64,
        filters: FilterSet,
        timestamp: DateTime<Utc>,
    },
    /// Advisory, non-fatal failure (`onError`)
    Error {
        kind: ErrorKind,
        message: String,
        timestamp: DateTime<Utc>,
    },
    /// The bus is shutting down; subscribers should exit their loops
    Shutdown { timestamp: DateTime<Utc> },
}

impl CoreEvent {
    #[must_use]
    pub fn result_set_ready(
        sequence: u64,
        query: Query,
        results: ResultSet,
        source: SearchSource,
    ) -> Self {
        CoreEvent::ResultSetReady {
            sequence,
            query,
            results,
            source,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn page_appended(
        listing_id: Uuid,
        entity_type: EntityType,
        generation: u64,
        items: Vec<Entity>,
        has_more: bool,
    ) -> Self {
        CoreEvent::PageAppended {
            listing_id,
            entity_type,
            generation,
            items,
            has_more,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn listing_reset(
        listing_id: Uuid,
        entity_type: EntityType,
        generation: u64,
        filters: FilterSet,
    ) -> Self {
        CoreEvent::ListingReset {
            listing_id,
            entity_type,
            generation,
            filters,
            timestamp: Utc::now(),
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        CoreEvent::Error {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn shutdown() -> Self {
        CoreEvent::Shutdown {
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            CoreEvent::ResultSetReady { timestamp, .. }
            | CoreEvent::PageAppended { timestamp, .. }
            | CoreEvent::ListingReset { timestamp, .. }
            | CoreEvent::Error { timestamp, .. }
            | CoreEvent::Shutdown { timestamp } => *timestamp,
        }
    }
}
