//! Content repository seam
//!
//! The coordinators talk to the backend only through the traits in
//! [`traits`]. Two backends are provided: HTTP adapters for the managed
//! backend (remote search function plus direct REST table queries) and an
//! in-process repository.

pub mod errors;
pub mod http;
pub mod memory;
pub mod postgrest;
pub mod remote;
pub mod schema;
pub mod traits;
pub mod types;

pub use errors::{ErrorKind, RepositoryError, RepositoryResult};
pub use http::HttpBackend;
pub use memory::{CallCounts, InMemoryRepository, RemoteMode};
pub use postgrest::PostgrestRepository;
pub use remote::RemoteAggregator;
pub use schema::RepositorySchema;
pub use traits::{AggregationEndpoint, ContentRepository, RegionResolver, TranslationIndex};
pub use types::{
    Entity, EntityType, FilterSet, Locale, Query, RegionKey, ResultSet, SortOrder,
    TranslationMatch,
};
