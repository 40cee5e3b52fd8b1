//! Worker tests for the incremental listing fetcher
//!
//! `GatedRepository` holds every `list_page` call until the test releases a
//! permit, which makes "request while loading" and "reset mid-fetch"
//! deterministic.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Semaphore, broadcast};

use super::*;
use crate::events::{CoreEvent, CoreEventBus};
use crate::repository::{
    ContentRepository, Entity, EntityType, FilterSet, InMemoryRepository, Locale, RegionKey,
    RepositoryError, RepositoryResult,
};

struct GatedRepository {
    inner: InMemoryRepository,
    gate: Semaphore,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl GatedRepository {
    fn new(inner: InMemoryRepository) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gate: Semaphore::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    fn release(&self, pages: usize) {
        self.gate.add_permits(pages);
    }
}

#[async_trait]
impl ContentRepository for GatedRepository {
    async fn fetch_by_ids(
        &self,
        entity_type: EntityType,
        ids: &[String],
        region: Option<&RegionKey>,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>> {
        self.inner.fetch_by_ids(entity_type, ids, region, limit).await
    }

    async fn search_text_columns(
        &self,
        entity_type: EntityType,
        text: &str,
        region: Option<&RegionKey>,
        locale: Locale,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>> {
        self.inner
            .search_text_columns(entity_type, text, region, locale, limit)
            .await
    }

    async fn list_page(
        &self,
        entity_type: EntityType,
        filters: &FilterSet,
        offset: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<Entity>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| RepositoryError::network("gate", e.to_string()))?;
        permit.forget();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.list_page(entity_type, filters, offset, limit).await
    }
}

fn products(count: u32) -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    for i in 1..=count {
        let category = if i % 3 == 0 { "X" } else { "Y" };
        repo.insert(
            EntityType::Product,
            json!({"id": i, "rank": i, "category": category}),
        )
        .unwrap();
    }
    repo
}

async fn next_update(rx: &mut broadcast::Receiver<ListingUpdate>) -> ListingUpdate {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("Timed out waiting for listing update")
        .expect("Update channel closed")
}

async fn next_page(rx: &mut broadcast::Receiver<ListingUpdate>) -> (u64, Vec<Entity>, bool) {
    loop {
        match next_update(rx).await {
            ListingUpdate::PageAppended {
                generation,
                items,
                has_more,
            } => return (generation, items, has_more),
            ListingUpdate::Failed { message, .. } => panic!("Unexpected failure: {message}"),
            ListingUpdate::Reset { .. } => {}
        }
    }
}

fn ordered() -> FilterSet {
    FilterSet::new().ordered_by("rank", false)
}

#[tokio::test]
async fn test_repeated_requests_issue_one_fetch() {
    let repo = GatedRepository::new(products(30));
    let (_service, listing) = ListingService::start(
        repo.clone(),
        ListingOptions::new(EntityType::Product).with_filters(ordered()),
    )
    .unwrap();
    let mut updates = listing.subscribe();

    for _ in 0..5 {
        listing.request_next_page().unwrap();
    }
    let snapshot = listing.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ListingState::Loading);
    assert_eq!(listing.stats().pages_requested, 1);
    assert_eq!(listing.stats().gated_requests, 4);

    repo.release(1);
    let (_, items, has_more) = next_page(&mut updates).await;
    assert_eq!(items.len(), 12);
    assert!(has_more);
    assert_eq!(repo.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reset_mid_fetch_discards_old_page() {
    let repo = GatedRepository::new(products(30));
    let (_service, listing) = ListingService::start(
        repo.clone(),
        ListingOptions::new(EntityType::Product).with_filters(ordered()),
    )
    .unwrap();
    let mut updates = listing.subscribe();

    listing.request_next_page().unwrap();
    listing
        .reset_and_load(ordered().with("category", "X"))
        .unwrap();
    repo.release(2);

    let (generation, items, has_more) = next_page(&mut updates).await;
    assert_eq!(generation, 1);
    assert_eq!(items.len(), 10);
    assert!(!has_more);
    assert!(
        items
            .iter()
            .all(|e| e.get("category") == Some(&json!("X")))
    );

    let snapshot = listing.snapshot().await.unwrap();
    assert_eq!(snapshot.generation, 1);
    assert_eq!(snapshot.items, items);
}

#[tokio::test]
async fn test_failure_keeps_loaded_items() {
    let repo = Arc::new(products(30));
    let (_service, listing) = ListingService::start(
        repo.clone(),
        ListingOptions::new(EntityType::Product).with_filters(ordered()),
    )
    .unwrap();
    let mut updates = listing.subscribe();

    listing.request_next_page().unwrap();
    let (_, first, _) = next_page(&mut updates).await;

    repo.fail_collection(
        EntityType::Product,
        RepositoryError::network("products", "connection reset"),
    );
    listing.request_next_page().unwrap();
    match next_update(&mut updates).await {
        ListingUpdate::Failed { kind, .. } => {
            assert_eq!(kind, crate::repository::ErrorKind::Network);
        }
        other => panic!("Expected failure, got {other:?}"),
    }

    let snapshot = listing.snapshot().await.unwrap();
    assert_eq!(snapshot.items, first);
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.state, ListingState::Idle);

    // no automatic retry, and no further pages until a reset
    repo.heal_collection(EntityType::Product);
    listing.request_next_page().unwrap();
    let _ = listing.snapshot().await.unwrap();
    assert_eq!(listing.stats().pages_requested, 2);
    assert_eq!(listing.stats().failures, 1);
}

#[tokio::test]
async fn test_paging_to_the_end_never_duplicates() {
    let repo = Arc::new(products(30));
    let (_service, listing) = ListingService::start(
        repo.clone(),
        ListingOptions::new(EntityType::Product)
            .with_filters(ordered())
            .with_page_size(12),
    )
    .unwrap();
    let mut updates = listing.subscribe();

    let mut pages = 0;
    loop {
        listing.request_next_page().unwrap();
        let (_, _, has_more) = next_page(&mut updates).await;
        pages += 1;
        if !has_more {
            break;
        }
    }

    let snapshot = listing.snapshot().await.unwrap();
    let mut ids = snapshot.ids();
    assert_eq!(pages, 3);
    assert_eq!(ids.len(), 30);
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 30);
    assert_eq!(snapshot.offset, 30);
}

#[tokio::test]
async fn test_events_are_published_on_bus() {
    let repo = Arc::new(products(5));
    let bus = CoreEventBus::new(16);
    let mut events = bus.subscribe();
    let (service, listing) = ListingService::start(
        repo,
        ListingOptions::new(EntityType::Product).with_events(bus.clone()),
    )
    .unwrap();

    listing.reset_and_load(FilterSet::default()).unwrap();

    let reset = bus.recv(&mut events).await.unwrap();
    assert!(matches!(reset, CoreEvent::ListingReset { generation: 1, .. }));

    match bus.recv(&mut events).await.unwrap() {
        CoreEvent::PageAppended {
            listing_id,
            items,
            has_more,
            ..
        } => {
            assert_eq!(listing_id, service.listing_id());
            assert_eq!(items.len(), 5);
            assert!(!has_more);
        }
        other => panic!("Expected PageAppended, got {other:?}"),
    }
}

#[tokio::test]
async fn test_shutdown_disconnects_handles() {
    let repo = Arc::new(products(5));
    let (service, listing) =
        ListingService::start(repo, ListingOptions::new(EntityType::Product)).unwrap();

    listing.shutdown().unwrap();
    tokio::time::timeout(Duration::from_secs(2), service.join())
        .await
        .unwrap();

    assert!(!listing.is_connected());
    assert_eq!(listing.request_next_page(), Err(ListingError::Disconnected));
    assert!(matches!(
        listing.snapshot().await,
        Err(ListingError::Disconnected)
    ));
}

#[tokio::test]
async fn test_dropping_handles_stops_worker() {
    let repo = Arc::new(products(5));
    let (service, listing) =
        ListingService::start(repo, ListingOptions::new(EntityType::Product)).unwrap();
    let clone = listing.clone();
    drop(listing);
    drop(clone);

    tokio::time::timeout(Duration::from_secs(2), service.join())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_store_and_deal_listings_are_rejected() {
    let repo = Arc::new(products(5));
    for entity_type in [EntityType::Store, EntityType::Deal] {
        let err = ListingService::start(repo.clone(), ListingOptions::new(entity_type))
            .unwrap_err();
        assert!(err.to_string().contains(entity_type.as_str()));
    }
    assert_eq!(repo.calls().list_page, 0);

    let (_service, listing) =
        ListingService::start(repo, ListingOptions::new(EntityType::Article)).unwrap();
    assert!(listing.is_connected());
}
