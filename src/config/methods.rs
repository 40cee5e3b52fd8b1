//! Builder methods available for all states
//!
//! This module contains methods that can be called on the builder
//! regardless of its current type state.

use super::builder::AcquireConfigBuilder;
use crate::repository::RepositorySchema;

impl<State> AcquireConfigBuilder<State> {
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn search_function(mut self, name: impl Into<String>) -> Self {
        self.search_function = name.into();
        self
    }

    /// Enable or disable the remote aggregation endpoint.
    ///
    /// With the endpoint disabled every search runs the direct query path,
    /// which is useful while the search function is being redeployed.
    #[must_use]
    pub fn remote_search_enabled(mut self, enabled: bool) -> Self {
        self.remote_search_enabled = enabled;
        self
    }

    #[must_use]
    pub fn search_page_size(mut self, size: usize) -> Self {
        self.search_page_size = size;
        self
    }

    #[must_use]
    pub fn listing_page_size(mut self, size: usize) -> Self {
        self.listing_page_size = size;
        self
    }

    /// Set the per-request transport timeout; `None` disables it
    #[must_use]
    pub fn request_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn event_bus_capacity(mut self, capacity: usize) -> Self {
        self.event_bus_capacity = capacity;
        self
    }

    #[must_use]
    pub fn schema(mut self, schema: RepositorySchema) -> Self {
        self.schema = schema;
        self
    }
}
