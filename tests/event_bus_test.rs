use deals_acquire::{
    CoreEvent, CoreEventBus, EntityType, ErrorKind, EventBusError, FilterSet, Query, ResultSet,
    SearchSource,
};
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

mod common;
use common::entity;

#[tokio::test]
async fn test_event_bus_creation() {
    let bus = CoreEventBus::new(100);
    assert_eq!(bus.subscriber_count(), 0);
    assert!(!bus.has_subscribers());
}

#[tokio::test]
async fn test_publish_with_no_subscribers() {
    let bus = CoreEventBus::new(10);
    let event = CoreEvent::error(ErrorKind::Network, "offline");

    match bus.publish(event) {
        Err(EventBusError::NoSubscribers) => {}
        other => panic!("Expected EventBusError::NoSubscribers, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_multiple_subscribers_receive_in_order() {
    let bus = CoreEventBus::new(10);
    let mut first = bus.subscribe();
    let mut second = bus.subscribe();
    assert_eq!(bus.subscriber_count(), 2);

    let listing_id = Uuid::new_v4();
    bus.publish(CoreEvent::listing_reset(
        listing_id,
        EntityType::Product,
        1,
        FilterSet::new().with("category", "X"),
    ))
    .unwrap();
    let delivered = bus
        .publish(CoreEvent::page_appended(
            listing_id,
            EntityType::Product,
            1,
            vec![entity("p-1")],
            false,
        ))
        .unwrap();
    assert_eq!(delivered, 2);

    for rx in [&mut first, &mut second] {
        let reset = timeout(Duration::from_secs(1), bus.recv(rx))
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(reset, CoreEvent::ListingReset { generation: 1, .. }));
        let page = timeout(Duration::from_secs(1), bus.recv(rx))
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(page, CoreEvent::PageAppended { has_more: false, .. }));
    }

    let stats = bus.stats();
    assert_eq!(stats.listing_resets, 1);
    assert_eq!(stats.pages_appended, 1);
    assert_eq!(stats.delivered(), 2);
}

#[tokio::test]
async fn test_events_serialize_with_type_tag() {
    let event = CoreEvent::result_set_ready(
        3,
        Query::new("noon"),
        ResultSet::new(vec![entity("s-1")], vec![], vec![], vec![]),
        SearchSource::Remote,
    );
    let value = serde_json::to_value(&event).unwrap();

    assert_eq!(value["type"], "result_set_ready");
    assert_eq!(value["sequence"], 3);
    assert_eq!(value["source"], "remote");
    assert_eq!(value["results"]["total"], 1);
    assert_eq!(value["results"]["stores"][0]["id"], "s-1");
    assert!(event.timestamp() <= chrono::Utc::now());
}
