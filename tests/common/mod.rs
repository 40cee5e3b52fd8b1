//! Test utilities and helper functions for the deals_acquire test suite

use async_trait::async_trait;
use deals_acquire::repository::{AggregationEndpoint, RemoteMode};
use deals_acquire::{
    Entity, EntityType, InMemoryRepository, Locale, RegionKey, RepositoryError,
    RepositoryResult, ResultSet,
};
use mockito::{Mock, ServerGuard};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

/// Install a test subscriber honoring `RUST_LOG`; safe to call repeatedly
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Entity with only an id
#[allow(dead_code)]
pub fn entity(id: impl Into<Value>) -> Entity {
    let id: Value = id.into();
    Entity::from_value(json!({ "id": id })).expect("valid test entity")
}

/// Ids of a collection, in order
#[allow(dead_code)]
pub fn ids(entities: &[Entity]) -> Vec<String> {
    entities.iter().map(|e| e.id().to_string()).collect()
}

/// Repository for the "noon" search in region "EG".
///
/// The remote endpoint answers HTTP 500. One Egyptian store matches through
/// the translation index (twice, via its English and Arabic rows); a Saudi
/// store with the same name is out of region; no deal matches; a product
/// matches but is never searched on the direct path; two guides mention
/// noon, one of them in Egypt.
#[allow(dead_code)]
pub fn noon_in_egypt() -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    repo.add_region("EG", RegionKey::new("r-eg"));
    repo.add_region("SA", RegionKey::new("r-sa"));

    let rows = [
        (EntityType::Store, json!({"id": "s-noon-eg", "region_id": "r-eg"})),
        (EntityType::Store, json!({"id": "s-noon-sa", "region_id": "r-sa"})),
        (EntityType::Store, json!({"id": "s-amazon-eg", "region_id": "r-eg"})),
        (EntityType::Deal, json!({"id": "d-amazon-eg", "region_id": "r-eg"})),
        (
            EntityType::Product,
            json!({"id": "p-1", "name": "Noon gift card", "region_id": "r-eg"}),
        ),
        (
            EntityType::Article,
            json!({"id": "a-1", "title_en": "Saving with Noon coupons", "region_id": "r-eg"}),
        ),
        (
            EntityType::Article,
            json!({"id": "a-2", "title_en": "Noon in Riyadh", "region_id": "r-sa"}),
        ),
        (
            EntityType::Article,
            json!({"id": "a-3", "title_en": "Amazon returns", "region_id": "r-eg"}),
        ),
    ];
    for (entity_type, record) in rows {
        repo.insert(entity_type, record).expect("valid fixture record");
    }

    repo.add_translation(EntityType::Store, "s-noon-eg", "Noon");
    repo.add_translation(EntityType::Store, "s-noon-eg", "نون");
    repo.add_translation(EntityType::Store, "s-noon-eg", "Noon Egypt");
    repo.add_translation(EntityType::Store, "s-noon-sa", "Noon KSA");
    repo.add_translation(EntityType::Store, "s-amazon-eg", "Amazon");
    repo.add_translation(EntityType::Deal, "d-amazon-eg", "Amazon 10% off");

    repo.set_remote_mode(RemoteMode::Fail(RepositoryError::Status {
        endpoint: "search".to_string(),
        status: 500,
    }));
    repo
}

/// Aggregation endpoint that holds chosen queries until released
#[allow(dead_code)]
pub struct HeldAggregation {
    inner: Arc<InMemoryRepository>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
}

#[allow(dead_code)]
impl HeldAggregation {
    pub fn new(inner: Arc<InMemoryRepository>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            holds: Mutex::new(HashMap::new()),
        })
    }

    /// Block searches for `text` until [`release`](Self::release)
    pub fn hold(&self, text: &str) {
        self.holds
            .lock()
            .insert(text.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, text: &str) {
        if let Some(notify) = self.holds.lock().get(text) {
            notify.notify_one();
        }
    }
}

#[async_trait]
impl AggregationEndpoint for HeldAggregation {
    async fn aggregate(
        &self,
        text: &str,
        region: Option<&RegionKey>,
        locale: Locale,
    ) -> RepositoryResult<ResultSet> {
        let hold = self.holds.lock().get(text).cloned();
        if let Some(notify) = hold {
            notify.notified().await;
        }
        self.inner.aggregate(text, region, locale).await
    }
}

/// JSON endpoint on the mock server
#[allow(dead_code)]
pub async fn json_mock(
    server: &mut ServerGuard,
    method: &str,
    path: &str,
    status: usize,
    body: &str,
) -> Mock {
    server
        .mock(method, path)
        .match_query(mockito::Matcher::Any)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}
