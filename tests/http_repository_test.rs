//! HTTP adapter tests against a mock backend

use deals_acquire::repository::{
    AggregationEndpoint, ContentRepository, HttpBackend, PostgrestRepository, RegionResolver,
    RemoteAggregator, TranslationIndex,
};
use deals_acquire::search::DirectSearch;
use deals_acquire::{
    AcquireConfig, EntityType, ErrorKind, FilterSet, Locale, Query, RegionKey, RepositoryError,
    RepositorySchema, SearchAggregator, SearchSource,
};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{ids, init_tracing, json_mock};

fn backend(url: &str) -> HttpBackend {
    HttpBackend::new(url, Some("test-key".to_string()), Some(Duration::from_secs(5)))
        .expect("valid backend")
}

fn tables(url: &str) -> PostgrestRepository {
    PostgrestRepository::new(backend(url), RepositorySchema::default())
}

#[tokio::test]
async fn test_remote_aggregator_request_shape() {
    init_tracing();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/functions/v1/search")
        .match_header("apikey", "test-key")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::Json(json!({
            "query": "noon",
            "region": "r-eg",
            "locale": "ar"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "stores": [{"id": "s-1"}],
                "deals": [{"id": 2}],
                "products": [],
                "guides": [{"id": "a-1"}],
                "total": 99
            })
            .to_string(),
        )
        .create_async()
        .await;

    let remote = RemoteAggregator::new(backend(&server.url()), "search");
    let results = remote
        .aggregate("noon", Some(&RegionKey::new("r-eg")), Locale::Ar)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(ids(results.stores()), vec!["s-1"]);
    assert_eq!(ids(results.deals()), vec!["2"]);
    // the reported total is ignored in favour of the record count
    assert_eq!(results.total(), 3);
}

#[tokio::test]
async fn test_remote_aggregator_classifies_failures() {
    let mut server = Server::new_async().await;
    let remote = RemoteAggregator::new(backend(&server.url()), "search");

    let status = json_mock(&mut server, "POST", "/functions/v1/search", 500, "{}").await;
    let err = remote.aggregate("noon", None, Locale::En).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Status { status: 500, .. }));
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.triggers_fallback());
    status.remove_async().await;

    let garbage = json_mock(&mut server, "POST", "/functions/v1/search", 200, "<html>").await;
    let err = remote.aggregate("noon", None, Locale::En).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    garbage.remove_async().await;

    let incomplete = json_mock(
        &mut server,
        "POST",
        "/functions/v1/search",
        200,
        r#"{"success": true, "stores": [], "deals": []}"#,
    )
    .await;
    let err = remote.aggregate("noon", None, Locale::En).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    incomplete.remove_async().await;

    let _failed = json_mock(
        &mut server,
        "POST",
        "/functions/v1/search",
        200,
        r#"{"success": false, "stores": [], "deals": [], "products": [], "guides": [], "total": 0, "error": "boom"}"#,
    )
    .await;
    let err = remote.aggregate("noon", None, Locale::En).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let remote = RemoteAggregator::new(backend("http://127.0.0.1:1"), "search");
    let err = remote.aggregate("noon", None, Locale::En).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Network { .. }));
}

#[tokio::test]
async fn test_translation_lookup_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/translations")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "entity_type,entity_id".into()),
            Matcher::UrlEncoded("entity_type".into(), "eq.store".into()),
            Matcher::UrlEncoded(
                "or".into(),
                r#"(name.ilike."*50\\%*",description.ilike."*50\\%*")"#.into(),
            ),
            Matcher::UrlEncoded("limit".into(), "500".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"entity_type": "store", "entity_id": 11}, {"entity_type": "store", "entity_id": "s-2"}]"#)
        .create_async()
        .await;

    let rows = tables(&server.url())
        .lookup(EntityType::Store, "50%*")
        .await
        .unwrap();

    mock.assert_async().await;
    let found: Vec<&str> = rows.iter().map(|m| m.entity_id.as_str()).collect();
    assert_eq!(found, vec!["11", "s-2"]);
}

#[tokio::test]
async fn test_fetch_by_ids_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/deals")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), r#"in.("d-1","d-2")"#.into()),
            Matcher::UrlEncoded("region_id".into(), "eq.r-eg".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"id": "d-1"}]"#)
        .create_async()
        .await;

    let repo = tables(&server.url());
    let found = repo
        .fetch_by_ids(
            EntityType::Deal,
            &["d-1".to_string(), "d-2".to_string()],
            Some(&RegionKey::new("r-eg")),
            10,
        )
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(ids(&found), vec!["d-1"]);

    // no ids, no request
    let none = repo
        .fetch_by_ids(EntityType::Deal, &[], None, 10)
        .await
        .unwrap();
    assert!(none.is_empty());
}

fn store_rows(ids: &[String]) -> String {
    let rows: Vec<_> = ids
        .iter()
        .map(|id| json!({ "id": id, "region_id": "r-eg" }))
        .collect();
    serde_json::Value::from(rows).to_string()
}

#[tokio::test]
async fn test_broad_index_match_hydrates_in_bounded_chunks() {
    init_tracing();
    let mut server = Server::new_async().await;
    let store_ids: Vec<String> = (0..350).map(|i| format!("s-{i:03}")).collect();
    let index_rows: Vec<_> = store_ids
        .iter()
        .map(|id| json!({ "entity_type": "store", "entity_id": id }))
        .collect();

    let index = server
        .mock("GET", "/rest/v1/translations")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("entity_type".into(), "eq.store".into()),
            Matcher::UrlEncoded("limit".into(), "500".into()),
        ]))
        .with_status(200)
        .with_body(serde_json::Value::from(index_rows).to_string())
        .create_async()
        .await;

    // each chunk of 100 ids yields a few in-region stores
    let in_region = |chunk: usize, take: usize| -> Vec<String> {
        (0..take)
            .map(|k| store_ids[chunk * 100 + k * 25].clone())
            .collect()
    };
    let mut chunks = Vec::new();
    for (chunk, (limit, body)) in [(10, 4), (6, 4), (2, 2), (0, 0)].into_iter().enumerate() {
        let id_list = store_ids
            .iter()
            .skip(chunk * 100)
            .take(100)
            .map(|id| format!("\"{id}\""))
            .collect::<Vec<_>>()
            .join(",");
        let mut mock = server
            .mock("GET", "/rest/v1/stores")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), format!("in.({id_list})")),
                Matcher::UrlEncoded("region_id".into(), "eq.r-eg".into()),
                Matcher::UrlEncoded("limit".into(), limit.to_string()),
            ]))
            .with_status(200)
            .with_body(store_rows(&in_region(chunk, body)));
        if chunk == 3 {
            mock = mock.expect(0);
        }
        chunks.push(mock.create_async().await);
    }

    let repo = tables(&server.url());
    let direct = DirectSearch::new(Arc::new(repo.clone()), Arc::new(repo), 10);
    let found = direct
        .find_by_text(
            EntityType::Store,
            "a",
            Some(&RegionKey::new("r-eg")),
            Locale::En,
        )
        .await
        .unwrap();

    index.assert_async().await;
    for mock in &chunks {
        mock.assert_async().await;
    }
    let expected: Vec<String> = (0..10).map(|i| format!("s-{:03}", i * 25)).collect();
    assert_eq!(ids(&found), expected);
}

#[tokio::test]
async fn test_list_page_query_and_malformed_rows() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/products")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("category".into(), "eq.X".into()),
            Matcher::UrlEncoded("region_id".into(), "eq.r-eg".into()),
            Matcher::UrlEncoded("order".into(), "rank.desc".into()),
            Matcher::UrlEncoded("offset".into(), "24".into()),
            Matcher::UrlEncoded("limit".into(), "12".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"id": 1}, {"name": "no id"}]"#)
        .create_async()
        .await;

    let filters = FilterSet::new()
        .with("category", "X")
        .with_region(RegionKey::new("r-eg"))
        .ordered_by("rank", true);
    let err = tables(&server.url())
        .list_page(EntityType::Product, &filters, 24, 12)
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn test_resolve_region_never_fails() {
    let mut server = Server::new_async().await;
    let repo = tables(&server.url());

    let found = server
        .mock("GET", "/rest/v1/regions")
        .match_query(Matcher::UrlEncoded("or".into(), r#"(code.eq."EG",slug.eq."EG")"#.into()))
        .with_status(200)
        .with_body(r#"[{"id": 5}]"#)
        .create_async()
        .await;
    assert_eq!(repo.resolve_region("EG").await, Some(RegionKey::new("5")));
    found.remove_async().await;

    let missing = json_mock(&mut server, "GET", "/rest/v1/regions", 200, "[]").await;
    assert_eq!(repo.resolve_region("atlantis").await, None);
    missing.remove_async().await;

    let _down = json_mock(&mut server, "GET", "/rest/v1/regions", 503, "down").await;
    assert_eq!(repo.resolve_region("EG").await, None);
    assert_eq!(repo.resolve_region("   ").await, None);
}

#[tokio::test]
async fn test_aggregator_from_config_falls_back_over_http() {
    init_tracing();
    let mut server = Server::new_async().await;
    let config = AcquireConfig::builder()
        .backend_url(server.url())
        .api_key("test-key")
        .build()
        .unwrap();

    let _search = json_mock(&mut server, "POST", "/functions/v1/search", 500, "oops").await;
    let _regions = server
        .mock("GET", "/rest/v1/regions")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": "r-eg"}]"#)
        .create_async()
        .await;
    let _store_index = server
        .mock("GET", "/rest/v1/translations")
        .match_query(Matcher::UrlEncoded("entity_type".into(), "eq.store".into()))
        .with_status(200)
        .with_body(
            r#"[{"entity_type": "store", "entity_id": "s-1"}, {"entity_type": "store", "entity_id": "s-1"}]"#,
        )
        .create_async()
        .await;
    let _deal_index = server
        .mock("GET", "/rest/v1/translations")
        .match_query(Matcher::UrlEncoded("entity_type".into(), "eq.deal".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let stores = server
        .mock("GET", "/rest/v1/stores")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), r#"in.("s-1")"#.into()),
            Matcher::UrlEncoded("region_id".into(), "eq.r-eg".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"id": "s-1", "name": "Noon"}]"#)
        .create_async()
        .await;
    let deals = server
        .mock("GET", "/rest/v1/deals")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let products = server
        .mock("GET", "/rest/v1/products")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let _articles = server
        .mock("GET", "/rest/v1/articles")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "or".into(),
                r#"(title_en.ilike."*noon*",excerpt_en.ilike."*noon*",content_en.ilike."*noon*")"#
                    .into(),
            ),
            Matcher::UrlEncoded("region_id".into(), "eq.r-eg".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"id": "a-1"}, {"id": "a-2"}]"#)
        .create_async()
        .await;

    let aggregator = SearchAggregator::from_config(&config).unwrap();
    let outcome = aggregator
        .search_detailed(&Query::new(" noon ").in_region("EG"))
        .await;

    assert_eq!(outcome.source, SearchSource::Fallback);
    assert_eq!(ids(outcome.results.stores()), vec!["s-1"]);
    assert!(outcome.results.deals().is_empty());
    assert!(outcome.results.products().is_empty());
    assert_eq!(outcome.results.guides().len(), 2);
    assert_eq!(outcome.results.total(), 3);

    stores.assert_async().await;
    deals.assert_async().await;
    products.assert_async().await;
}
