mod common;

use chrono::{Duration, Utc};
use common::{StubApi, TempDb, discover_page, movie};
use marquee::db::{StalenessPolicy, Store};
use marquee::entities::query_result_cache;
use marquee::search::{RawParams, SearchError, fingerprint, normalize};
use marquee::services::{SearchService, UpstreamSearchClient};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{Value, json};
use std::sync::Arc;

fn params(value: Value) -> RawParams {
    value.as_object().cloned().unwrap()
}

fn movies_2020() -> RawParams {
    params(json!({
        "media_type": "movie",
        "start_date": "2020-01-01",
        "end_date": "2020-12-31",
    }))
}

async fn service(db: &TempDb, api: Arc<StubApi>) -> (SearchService, Store) {
    let store = Store::new(&db.url()).await.unwrap();
    let service = SearchService::new(
        store.clone(),
        UpstreamSearchClient::new(api),
        StalenessPolicy::default(),
    );
    (service, store)
}

/// Inserts an already-populated row whose last refresh was `age` ago.
async fn seed_row(store: &Store, raw: &RawParams, title: &str, age: Duration) -> i32 {
    let key = fingerprint(&normalize(raw).unwrap());
    let entry = store.get_or_create_cache_entry(&key, 1).await.unwrap();

    let payload = json!([{
        "id": 7,
        "media_type": "movie",
        "title": title,
        "release_date": "2020-03-01",
        "overview": null,
        "poster_path": null,
        "popularity": 1.0,
        "vote_average": 5.0,
        "vote_count": 3,
        "original_language": "en",
        "adult": false,
        "genre_ids": [18]
    }]);

    let model = query_result_cache::Entity::find_by_id(entry.id)
        .one(&store.conn)
        .await
        .unwrap()
        .unwrap();
    let mut active: query_result_cache::ActiveModel = model.into();
    active.results = Set(Some(payload.to_string()));
    active.last_queried_at = Set(Some((Utc::now() - age).to_rfc3339()));
    active.total_pages = Set(Some(4));
    active.total_results = Set(Some(61));
    active.update(&store.conn).await.unwrap();

    entry.id
}

#[tokio::test]
async fn test_miss_then_hit() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::returning(discover_page(
        vec![movie(1, "Test Movie", &[28])],
        3,
        55,
    )));
    let (service, store) = service(&db, api.clone()).await;

    let first = service.search(&movies_2020()).await.unwrap();
    assert!(!first.cached);
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.items[0].title.as_deref(), Some("Test Movie"));
    assert_eq!(first.query_key.len(), 64);
    assert!(first.last_updated.is_some());
    assert_eq!(first.pagination.total_pages, 3);
    assert_eq!(first.pagination.total_results, 55);
    assert_eq!(first.pagination.per_page, 20);

    let second = service.search(&movies_2020()).await.unwrap();
    assert!(second.cached);
    assert_eq!(second.items, first.items);
    assert_eq!(second.query_key, first.query_key);
    assert_eq!(second.pagination, first.pagination);

    assert_eq!(api.call_count(), 1);
    assert_eq!(store.count_cache_entries().await.unwrap(), 1);
}

#[tokio::test]
async fn test_equivalent_requests_share_a_row() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::returning(discover_page(
        vec![movie(1, "Test Movie", &[])],
        1,
        1,
    )));
    let (service, store) = service(&db, api.clone()).await;

    let a = params(json!({"media_type": "movie", "genre_ids": "28,12", "sort_by": ""}));
    let b = params(json!({"media_type": "movie", "genre_ids": ["12", "28", "28"]}));

    let first = service.search(&a).await.unwrap();
    let second = service.search(&b).await.unwrap();

    assert_eq!(first.query_key, second.query_key);
    assert!(second.cached);
    assert_eq!(api.call_count(), 1);
    assert_eq!(store.count_cache_entries().await.unwrap(), 1);
}

#[tokio::test]
async fn test_upstream_receives_translated_query() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::returning(discover_page(
        vec![movie(1, "Test Movie", &[])],
        1,
        1,
    )));
    let (service, _store) = service(&db, api.clone()).await;

    let raw = params(json!({
        "media_type": "tv",
        "start_date": "2019-01-01",
        "min_rating": "7.5",
        "page": "900",
    }));
    service.search(&raw).await.unwrap();

    let query = api.last_query().unwrap();
    assert!(query.contains(&("first_air_date.gte".to_string(), "2019-01-01".to_string())));
    assert!(query.contains(&("vote_average.gte".to_string(), "7.5".to_string())));
    assert!(query.contains(&("page".to_string(), "500".to_string())));
}

#[tokio::test]
async fn test_empty_upstream_leaves_row_untouched() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::returning(discover_page(Vec::new(), 0, 0)));
    let (service, store) = service(&db, api.clone()).await;

    let raw = movies_2020();
    let id = seed_row(&store, &raw, "Seeded", Duration::days(3)).await;
    let before = query_result_cache::Entity::find_by_id(id)
        .one(&store.conn)
        .await
        .unwrap()
        .unwrap();

    let outcome = service.search(&raw).await.unwrap();
    assert!(!outcome.cached);
    assert!(outcome.items.is_empty());
    assert!(outcome.last_updated.is_none());
    assert_eq!(outcome.pagination.page, 1);
    assert_eq!(api.call_count(), 1);

    let after = query_result_cache::Entity::find_by_id(id)
        .one(&store.conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_stale_row_is_refreshed() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::returning(discover_page(
        vec![movie(2, "Fresh", &[])],
        2,
        30,
    )));
    let (service, store) = service(&db, api.clone()).await;

    let raw = movies_2020();
    seed_row(&store, &raw, "Seeded", Duration::hours(25)).await;

    let outcome = service.search(&raw).await.unwrap();
    assert!(!outcome.cached);
    assert_eq!(outcome.items[0].title.as_deref(), Some("Fresh"));
    assert_eq!(api.call_count(), 1);

    let entry = store
        .find_cache_entry(&outcome.query_key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.read_payload()[0].title.as_deref(), Some("Fresh"));
    assert_eq!(entry.total_pages, Some(2));
}

#[tokio::test]
async fn test_filtered_row_within_day_is_served_from_cache() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::failing(500));
    let (service, store) = service(&db, api.clone()).await;

    let raw = movies_2020();
    seed_row(&store, &raw, "Seeded", Duration::hours(5)).await;

    let outcome = service.search(&raw).await.unwrap();
    assert!(outcome.cached);
    assert_eq!(outcome.items[0].title.as_deref(), Some("Seeded"));
    assert_eq!(outcome.pagination.total_pages, 4);
    assert_eq!(outcome.pagination.total_results, 61);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_unfiltered_row_expires_after_an_hour() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::returning(discover_page(
        vec![movie(3, "Popular", &[])],
        500,
        10_000,
    )));
    let (service, store) = service(&db, api.clone()).await;

    let raw = params(json!({"media_type": "movie"}));
    seed_row(&store, &raw, "Seeded", Duration::minutes(90)).await;

    let outcome = service.search(&raw).await.unwrap();
    assert!(!outcome.cached);
    assert_eq!(outcome.items[0].title.as_deref(), Some("Popular"));
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn test_upstream_page_count_is_capped() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::returning(discover_page(
        vec![movie(1, "Test Movie", &[])],
        40_000,
        800_000,
    )));
    let (service, store) = service(&db, api).await;

    let outcome = service.search(&movies_2020()).await.unwrap();
    assert_eq!(outcome.pagination.total_pages, 500);

    let entry = store
        .find_cache_entry(&outcome.query_key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.total_pages, Some(500));
    assert_eq!(entry.total_results, Some(800_000));
}

#[tokio::test]
async fn test_invalid_sort_creates_no_row() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::returning(discover_page(Vec::new(), 0, 0)));
    let (service, store) = service(&db, api.clone()).await;

    let raw = params(json!({"media_type": "tv", "sort_by": "revenue.desc"}));
    let err = service.search(&raw).await.unwrap_err();

    assert!(matches!(err, SearchError::InvalidSortToken { .. }));
    assert_eq!(store.count_cache_entries().await.unwrap(), 0);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_media_type_is_rejected() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::returning(discover_page(Vec::new(), 0, 0)));
    let (service, store) = service(&db, api).await;

    let err = service
        .search(&params(json!({"media_type": "anime"})))
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::InvalidMediaKind(Some(ref v)) if v == "anime"));
    assert_eq!(store.count_cache_entries().await.unwrap(), 0);
}

#[tokio::test]
async fn test_upstream_failure_propagates() {
    let db = TempDb::new();
    let api = Arc::new(StubApi::failing(401));
    let (service, store) = service(&db, api.clone()).await;

    let err = service.search(&movies_2020()).await.unwrap_err();
    assert!(matches!(err, SearchError::Upstream { status: 401 }));

    // The row exists but was never populated, so the next call retries upstream
    let key = fingerprint(&normalize(&movies_2020()).unwrap());
    let entry = store.find_cache_entry(&key).await.unwrap().unwrap();
    assert!(entry.last_refreshed_at.is_none());

    api.set_response(discover_page(vec![movie(1, "Recovered", &[])], 1, 1));
    let outcome = service.search(&movies_2020()).await.unwrap();
    assert!(!outcome.cached);
    assert_eq!(api.call_count(), 2);
}
