//! Type-safe builder for `AcquireConfig` using the typestate pattern
//!
//! The backend URL is the only required value; `build()` exists only once it
//! has been supplied.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;

use crate::repository::RepositorySchema;
use crate::utils::{
    EVENT_BUS_CAPACITY, LISTING_PAGE_SIZE, REQUEST_TIMEOUT_SECS, SEARCH_FUNCTION, SEARCH_PAGE_SIZE,
};

use super::types::AcquireConfig;

// Type states for the builder
pub struct WithBackendUrl;

pub struct AcquireConfigBuilder<State = ()> {
    pub(crate) backend_url: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) search_function: String,
    pub(crate) remote_search_enabled: bool,
    pub(crate) search_page_size: usize,
    pub(crate) listing_page_size: usize,
    pub(crate) request_timeout_secs: Option<u64>,
    pub(crate) event_bus_capacity: usize,
    pub(crate) schema: RepositorySchema,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for AcquireConfigBuilder<()> {
    fn default() -> Self {
        Self {
            backend_url: None,
            api_key: None,
            search_function: SEARCH_FUNCTION.to_string(),
            remote_search_enabled: true,
            search_page_size: SEARCH_PAGE_SIZE,
            listing_page_size: LISTING_PAGE_SIZE,
            request_timeout_secs: Some(REQUEST_TIMEOUT_SECS),
            event_bus_capacity: EVENT_BUS_CAPACITY,
            schema: RepositorySchema::default(),
            _phantom: PhantomData,
        }
    }
}

impl AcquireConfig {
    /// Create a builder for configuring an `AcquireConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> AcquireConfigBuilder<()> {
        AcquireConfigBuilder::default()
    }
}

impl AcquireConfigBuilder<()> {
    pub fn backend_url(self, url: impl Into<String>) -> AcquireConfigBuilder<WithBackendUrl> {
        let url_string = url.into();
        // Bare hosts are assumed to be https
        let normalized_url =
            if url_string.starts_with("http://") || url_string.starts_with("https://") {
                url_string
            } else {
                format!("https://{url_string}")
            };

        AcquireConfigBuilder {
            backend_url: Some(normalized_url),
            api_key: self.api_key,
            search_function: self.search_function,
            remote_search_enabled: self.remote_search_enabled,
            search_page_size: self.search_page_size,
            listing_page_size: self.listing_page_size,
            request_timeout_secs: self.request_timeout_secs,
            event_bus_capacity: self.event_bus_capacity,
            schema: self.schema,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when all required fields are set
impl AcquireConfigBuilder<WithBackendUrl> {
    pub fn build(self) -> Result<AcquireConfig> {
        let config = AcquireConfig {
            backend_url: self
                .backend_url
                .ok_or_else(|| anyhow!("backend_url is required"))?,
            api_key: self.api_key.filter(|key| !key.trim().is_empty()),
            search_function: self.search_function,
            remote_search_enabled: self.remote_search_enabled,
            search_page_size: self.search_page_size,
            listing_page_size: self.listing_page_size,
            request_timeout_secs: self.request_timeout_secs,
            event_bus_capacity: self.event_bus_capacity,
            schema: self.schema,
        };

        config.validate()?;

        if !config.remote_search_enabled {
            tracing::info!("Remote search disabled, all searches use the direct query path");
        }

        Ok(config)
    }
}
