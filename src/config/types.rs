//! Core configuration type for the acquisition layer
//!
//! `AcquireConfig` is normally produced by the typestate builder in
//! [`super::builder`], which validates it. Configurations loaded from JSON
//! go through [`AcquireConfig::from_json`] so they receive the same checks.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::repository::RepositorySchema;
use crate::utils::{
    EVENT_BUS_CAPACITY, LISTING_PAGE_SIZE, REQUEST_TIMEOUT_SECS, SEARCH_FUNCTION, SEARCH_PAGE_SIZE,
    parse_base_url,
};

/// Configuration for the backend adapters and the coordinators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquireConfig {
    /// Base URL of the managed backend.
    ///
    /// **INVARIANT:** parses as an `http`/`https` URL (checked in `build`).
    pub(crate) backend_url: String,

    /// Anonymous API key sent as `apikey` and bearer token.
    /// Never serialized back out.
    #[serde(default, skip_serializing)]
    pub(crate) api_key: Option<String>,

    /// Name of the server-side aggregation function
    #[serde(default = "default_search_function")]
    pub(crate) search_function: String,

    /// When false the aggregator goes straight to the direct path
    #[serde(default = "default_true")]
    pub(crate) remote_search_enabled: bool,

    /// Per-collection cap on the direct search path
    #[serde(default = "default_search_page_size")]
    pub(crate) search_page_size: usize,

    /// Page size for product and article listings
    #[serde(default = "default_listing_page_size")]
    pub(crate) listing_page_size: usize,

    /// Transport timeout applied to every backend request.
    ///
    /// `None` disables the timeout, in which case a hung request keeps the
    /// corresponding listing in `Loading` indefinitely.
    ///
    /// Default: 15 seconds
    #[serde(default = "default_request_timeout_secs")]
    pub(crate) request_timeout_secs: Option<u64>,

    /// Buffer size of the core event bus
    #[serde(default = "default_event_bus_capacity")]
    pub(crate) event_bus_capacity: usize,

    #[serde(default)]
    pub(crate) schema: RepositorySchema,
}

impl AcquireConfig {
    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AcquireConfig =
            serde_json::from_str(json).context("Failed to parse acquisition config")?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        parse_base_url(&self.backend_url)?;

        if self.search_function.trim().is_empty() {
            return Err(anyhow!("search_function must not be empty"));
        }
        if self.search_page_size == 0 {
            return Err(anyhow!("search_page_size must be greater than zero"));
        }
        if self.listing_page_size == 0 {
            return Err(anyhow!("listing_page_size must be greater than zero"));
        }
        if self.event_bus_capacity == 0 {
            return Err(anyhow!("event_bus_capacity must be greater than zero"));
        }

        self.schema.validate()
    }
}

fn default_search_function() -> String {
    SEARCH_FUNCTION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_search_page_size() -> usize {
    SEARCH_PAGE_SIZE
}

fn default_listing_page_size() -> usize {
    LISTING_PAGE_SIZE
}

fn default_request_timeout_secs() -> Option<u64> {
    Some(REQUEST_TIMEOUT_SECS)
}

fn default_event_bus_capacity() -> usize {
    EVENT_BUS_CAPACITY
}
