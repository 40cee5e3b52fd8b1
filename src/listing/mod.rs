//! Incremental listing fetcher
//!
//! Product and article listings load page by page as the user scrolls.
//! A worker task owns the offset cursor and dedup set:
//!
//! - `cursor` - pure cursor state machine (gate, generation, dedup)
//! - `service` - background worker applying commands and page completions
//! - `sender` - [`ListingHandle`], the cloneable command API
//! - `stats` - lock-free counters
//!
//! # Example
//!
//! ```ignore
//! let (service, listing) = ListingService::start(repository, ListingOptions::new(EntityType::Product))?;
//! let mut updates = listing.subscribe();
//!
//! listing.request_next_page()?;
//! listing.reset_and_load(FilterSet::new().with("category", "electronics"))?;
//! ```

mod cursor;
mod errors;
mod sender;
mod service;
mod stats;
mod types;

pub use cursor::{ListingCursor, PageApplied};
pub use errors::ListingError;
pub use sender::ListingHandle;
pub use service::ListingService;
pub use stats::{ListingStats, ListingStatsSnapshot};
pub use types::{ListingOptions, ListingSnapshot, ListingState, ListingUpdate, PageRequest};

#[cfg(test)]
mod tests;
