//! Shared HTTP plumbing for the backend adapters
//!
//! One `reqwest::Client` is built per backend and cloned into every adapter.
//! Responses are read fully and decoded here so that status and payload
//! failures are classified the same way everywhere.

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::errors::{RepositoryError, RepositoryResult};
use crate::config::AcquireConfig;
use crate::utils::{USER_AGENT, function_url, parse_base_url, table_url};

/// Connection to the managed backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base = parse_base_url(base_url)?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base,
            api_key,
        })
    }

    pub fn from_config(config: &AcquireConfig) -> Result<Self> {
        Self::new(
            config.backend_url(),
            config.api_key().map(str::to_string),
            config.request_timeout(),
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub(crate) fn table_url(&self, table: &str) -> RepositoryResult<Url> {
        table_url(&self.base, table).map_err(|e| RepositoryError::network(table, e.to_string()))
    }

    pub(crate) fn function_url(&self, function: &str) -> RepositoryResult<Url> {
        function_url(&self.base, function)
            .map_err(|e| RepositoryError::network(function, e.to_string()))
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.authorize(self.client.get(url))
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.authorize(self.client.post(url))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    /// Send a request and decode a JSON body.
    ///
    /// Transport failures map to `Network`, non-2xx to `Status`, and bodies
    /// that do not decode as `T` to `MalformedResponse`.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> RepositoryResult<T> {
        let response = request
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| RepositoryError::from_reqwest(endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("{endpoint} responded with status {status}");
            return Err(RepositoryError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RepositoryError::from_reqwest(endpoint, &e))?;

        serde_json::from_slice(&body).map_err(|e| RepositoryError::malformed(endpoint, e.to_string()))
    }
}
