//! Getter methods for `AcquireConfig`

use std::time::Duration;

use super::types::AcquireConfig;
use crate::repository::RepositorySchema;

impl AcquireConfig {
    #[must_use]
    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub fn search_function(&self) -> &str {
        &self.search_function
    }

    #[must_use]
    pub fn remote_search_enabled(&self) -> bool {
        self.remote_search_enabled
    }

    #[must_use]
    pub fn search_page_size(&self) -> usize {
        self.search_page_size
    }

    #[must_use]
    pub fn listing_page_size(&self) -> usize {
        self.listing_page_size
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn event_bus_capacity(&self) -> usize {
        self.event_bus_capacity
    }

    #[must_use]
    pub fn schema(&self) -> &RepositorySchema {
        &self.schema
    }
}
