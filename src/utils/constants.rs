//! Shared configuration constants
//!
//! Default values used by the configuration builder and the coordinators so
//! that magic numbers live in one place.

/// Maximum results per collection on the direct search path
///
/// The remote aggregation endpoint applies its own limits; this cap only
/// governs the fallback queries issued against the content tables.
pub const SEARCH_PAGE_SIZE: usize = 10;

/// Default page size for product and article listings
pub const LISTING_PAGE_SIZE: usize = 12;

/// Default per-request transport timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default name of the backend search function
pub const SEARCH_FUNCTION: &str = "search";

/// Default event bus buffer size
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Path prefix of the table REST API on the managed backend
pub const REST_PATH: &str = "rest/v1";

/// Path prefix of server-side functions on the managed backend
pub const FUNCTIONS_PATH: &str = "functions/v1";

/// User agent sent with every backend request
pub const USER_AGENT: &str = concat!("deals_acquire/", env!("CARGO_PKG_VERSION"));
