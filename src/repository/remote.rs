//! Remote aggregation endpoint
//!
//! The backend search function performs index lookups, hydration and region
//! scoping server-side and answers with all four collections at once. Its
//! payload is accepted only when it is complete and flagged successful.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{RepositoryError, RepositoryResult};
use super::http::HttpBackend;
use super::traits::AggregationEndpoint;
use super::types::{Entity, Locale, RegionKey, ResultSet};

#[derive(Debug, Serialize)]
struct AggregationRequest<'a> {
    query: &'a str,
    region: Option<&'a str>,
    locale: Locale,
}

/// Wire shape of the search function response
#[derive(Debug, Deserialize)]
pub(crate) struct AggregationPayload {
    success: bool,
    stores: Vec<Value>,
    deals: Vec<Value>,
    products: Vec<Value>,
    guides: Vec<Value>,
    total: usize,
    #[serde(default)]
    error: Option<String>,
}

impl AggregationPayload {
    pub(crate) fn into_result_set(self, endpoint: &str) -> RepositoryResult<ResultSet> {
        if !self.success {
            let reason = self.error.unwrap_or_else(|| "no reason given".to_string());
            return Err(RepositoryError::malformed(
                endpoint,
                format!("search function reported failure: {reason}"),
            ));
        }

        // Report record problems against the endpoint, not the entity
        let hydrate = |values: Vec<Value>| {
            Entity::from_values(values).map_err(|e| match e {
                RepositoryError::MalformedResponse { message, .. } => {
                    RepositoryError::malformed(endpoint, message)
                }
                other => other,
            })
        };

        let reported_total = self.total;
        let results = ResultSet::new(
            hydrate(self.stores)?,
            hydrate(self.deals)?,
            hydrate(self.products)?,
            hydrate(self.guides)?,
        );

        if results.total() != reported_total {
            log::warn!(
                "{endpoint} reported total {reported_total} but returned {} records, using the record count",
                results.total()
            );
        }

        Ok(results)
    }
}

/// [`AggregationEndpoint`] backed by the backend search function
#[derive(Debug, Clone)]
pub struct RemoteAggregator {
    backend: HttpBackend,
    function: String,
}

impl RemoteAggregator {
    pub fn new(backend: HttpBackend, function: impl Into<String>) -> Self {
        Self {
            backend,
            function: function.into(),
        }
    }
}

#[async_trait]
impl AggregationEndpoint for RemoteAggregator {
    async fn aggregate(
        &self,
        text: &str,
        region: Option<&RegionKey>,
        locale: Locale,
    ) -> RepositoryResult<ResultSet> {
        let url = self.backend.function_url(&self.function)?;
        let body = AggregationRequest {
            query: text,
            region: region.map(RegionKey::as_str),
            locale,
        };

        log::debug!("Calling search function {url} for '{text}'");
        let payload: AggregationPayload = self
            .backend
            .send_json(&self.function, self.backend.post(url).json(&body))
            .await?;

        payload.into_result_set(&self.function)
    }
}
