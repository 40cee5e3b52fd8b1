//! Event system delivering core outputs to the presentation layer
//!
//! Search sessions and listing services publish [`CoreEvent`]s on a shared
//! [`CoreEventBus`]; any number of subscribers can follow them.

// Sub-modules
pub mod bus;
pub mod errors;
pub mod stats;
pub mod types;

// Re-exports for public API
pub use bus::CoreEventBus;
pub use errors::EventBusError;
pub use stats::{EventBusStats, EventBusStatsSnapshot};
pub use types::CoreEvent;
