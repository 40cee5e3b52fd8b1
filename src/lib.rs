//! Result-acquisition core for a localized coupon and deals marketplace.
//!
//! Two coordinators sit between the presentation layer and the backend:
//!
//! - [`SearchAggregator`] resolves a free-text [`Query`] into a
//!   [`ResultSet`] across stores, deals, products and guides. It asks the
//!   remote aggregation endpoint first and falls back to direct table
//!   queries, degrading per collection instead of failing.
//! - [`ListingService`] loads product and article listings page by page
//!   with an offset cursor, deduplicating items and discarding pages that
//!   belong to superseded filters.
//!
//! Backends plug in through the traits in [`repository`]. HTTP adapters for
//! a PostgREST-style managed backend and an in-process
//! [`InMemoryRepository`] are included.

pub mod config;
pub mod events;
pub mod listing;
pub mod repository;
pub mod search;
pub mod utils;

pub use config::{AcquireConfig, AcquireConfigBuilder};
pub use events::{CoreEvent, CoreEventBus, EventBusError};
pub use listing::{
    ListingError, ListingHandle, ListingOptions, ListingService, ListingSnapshot, ListingState,
    ListingUpdate,
};
pub use repository::{
    AggregationEndpoint, ContentRepository, Entity, EntityType, ErrorKind, FilterSet,
    InMemoryRepository, Locale, Query, RegionKey, RegionResolver, RepositoryError,
    RepositoryResult, RepositorySchema, ResultSet, TranslationIndex,
};
pub use search::{SearchAggregator, SearchOutcome, SearchSession, SearchSource};
