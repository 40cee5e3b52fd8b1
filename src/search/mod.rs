//! Federated search
//!
//! - `aggregator` - [`SearchAggregator`], remote first with a direct fallback
//! - `fallback` - [`DirectSearch`], per-collection queries against the tables
//! - `session` - [`SearchSession`], sequence-tagged application of results
//! - `stats` - lock-free counters
//! - `runtime_helpers` - primary/fallback execution helper

pub mod aggregator;
pub mod fallback;
pub mod runtime_helpers;
pub mod session;
pub mod stats;
pub mod types;

pub use aggregator::SearchAggregator;
pub use fallback::{DirectResults, DirectSearch};
pub use runtime_helpers::{Branch, fallback_task};
pub use session::SearchSession;
pub use stats::{SearchStats, SearchStatsSnapshot};
pub use types::{SearchOutcome, SearchSource};
