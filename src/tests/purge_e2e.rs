//! Drives the full workflow (query → scroll → confirm → bulk delete →
//! cache invalidation) against a wiremock search backend and a recording
//! in-memory cache.

use std::{num::NonZeroUsize, sync::Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::{
    cache::{CacheResult, HistoryCache},
    config::PurgeConfig,
    purge::{self, Outcome},
    search::{ConversationFilter, SearchClient},
};

/// In-memory stand-in for Redis that records every batched delete.
#[derive(Default)]
struct RecordingCache {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingCache {
    fn deleted_keys(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryCache for RecordingCache {
    async fn delete_keys(&self, keys: &[String]) -> CacheResult<()> {
        self.calls.lock().unwrap().push(keys.to_vec());
        Ok(())
    }
}

fn test_config(backend: &MockServer) -> PurgeConfig {
    let mut config = PurgeConfig::default();
    config.search.url = backend.uri();
    config
}

fn hit(id: &str, chat_id: &str) -> Value {
    json!({
        "_index": "private-2016-05",
        "_type": "message",
        "_id": id,
        "fields": {
            "from.user_id": [7],
            "to.user_id": [13],
            "date": ["2016-05-04T07:13:48.123Z"],
            "privatechat_id": [chat_id],
        }
    })
}

fn page(scroll_id: &str, hits: Vec<Value>) -> Value {
    json!({ "_scroll_id": scroll_id, "hits": { "hits": hits } })
}

/// Mount the scroll search endpoints: one first page, any number of
/// continuation pages, then empty pages forever.
async fn mount_scroll(backend: &MockServer, first_page: Value, continuations: Vec<Value>) {
    Mock::given(method("POST"))
        .and(path("/private-*/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first_page))
        .mount(backend)
        .await;

    for continuation in continuations {
        Mock::given(method("POST"))
            .and(path("/_search/scroll"))
            .respond_with(ResponseTemplate::new(200).set_body_json(continuation))
            .up_to_n_times(1)
            .mount(backend)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/_search/scroll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page("cursor", vec![])))
        .mount(backend)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/_search/scroll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"succeeded": true})))
        .mount(backend)
        .await;
}

async fn mount_bulk(backend: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "took": 3, "errors": false, "items": [] })),
        )
        .mount(backend)
        .await;
}

/// Document ids named in the bodies of all received bulk requests, one
/// inner vec per request.
async fn bulk_request_ids(backend: &MockServer) -> Vec<Vec<String>> {
    backend
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/_bulk")
        .map(|r| {
            String::from_utf8(r.body.clone())
                .unwrap()
                .lines()
                .map(|line| {
                    let action: Value = serde_json::from_str(line).unwrap();
                    action["delete"]["_id"].as_str().unwrap().to_string()
                })
                .collect()
        })
        .collect()
}

#[tokio::test]
async fn purge_walks_the_scroll_and_clears_affected_history() {
    let backend = MockServer::start().await;
    // Three messages across two conversations, split over two scroll pages.
    mount_scroll(
        &backend,
        page("c1", vec![hit("m1", "7-13"), hit("m2", "7-13")]),
        vec![page("c2", vec![hit("m3", "7-13-archived")])],
    )
    .await;
    mount_bulk(&backend).await;

    let cache = RecordingCache::default();
    let config = test_config(&backend);
    let search = SearchClient::from_config(&config.search).unwrap();
    let filter = ConversationFilter::new("7", "13", false);

    let outcome = purge::run(&search, Some(&cache), &config, &filter, false, |_| {
        panic!("confirmation must not be consulted in non-interactive mode")
    })
    .await
    .unwrap();

    assert_eq!(
        outcome,
        Outcome::Completed {
            deleted: 3,
            cache_keys_cleared: 2,
        }
    );

    // One bulk request carrying exactly the three fetched documents.
    assert_eq!(bulk_request_ids(&backend).await, [["m1", "m2", "m3"]]);

    // One batched cache delete, one key per distinct conversation.
    assert_eq!(
        cache.deleted_keys(),
        [["history:pchat:7-13", "history:pchat:7-13-archived"]]
    );
}

#[tokio::test]
async fn empty_result_set_mutates_nothing() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/private-*/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": { "hits": [] } })))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&backend)
        .await;

    let cache = RecordingCache::default();
    let config = test_config(&backend);
    let search = SearchClient::from_config(&config.search).unwrap();
    let filter = ConversationFilter::new("7", "13", false);

    let outcome = purge::run(&search, Some(&cache), &config, &filter, false, |_| true)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::NothingToDelete);
    assert!(cache.deleted_keys().is_empty());
}

#[tokio::test]
async fn declined_confirmation_mutates_nothing() {
    let backend = MockServer::start().await;
    mount_scroll(&backend, page("c1", vec![hit("m1", "7-13")]), vec![]).await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&backend)
        .await;

    let cache = RecordingCache::default();
    let config = test_config(&backend);
    let search = SearchClient::from_config(&config.search).unwrap();
    let filter = ConversationFilter::new("7", "13", true);

    let outcome = purge::run(&search, Some(&cache), &config, &filter, true, |_| false)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Aborted);
    assert!(cache.deleted_keys().is_empty());
}

#[tokio::test]
async fn confirmed_interactive_run_sees_the_fetched_set() {
    let backend = MockServer::start().await;
    mount_scroll(
        &backend,
        page("c1", vec![hit("m1", "7-13"), hit("m2", "7-13")]),
        vec![],
    )
    .await;
    mount_bulk(&backend).await;

    let cache = RecordingCache::default();
    let config = test_config(&backend);
    let search = SearchClient::from_config(&config.search).unwrap();
    let filter = ConversationFilter::new("7", "13", false);

    let outcome = purge::run(&search, Some(&cache), &config, &filter, true, |fetched| {
        assert_eq!(fetched.descriptors.len(), 2);
        assert_eq!(fetched.conversation_ids.len(), 1);
        true
    })
    .await
    .unwrap();

    assert_eq!(
        outcome,
        Outcome::Completed {
            deleted: 2,
            cache_keys_cleared: 1,
        }
    );
}

#[tokio::test]
async fn skipping_cache_invalidation_leaves_redis_alone() {
    let backend = MockServer::start().await;
    mount_scroll(&backend, page("c1", vec![hit("m1", "7-13")]), vec![]).await;
    mount_bulk(&backend).await;

    let config = test_config(&backend);
    let search = SearchClient::from_config(&config.search).unwrap();
    let filter = ConversationFilter::new("7", "13", false);

    let outcome = purge::run(&search, None, &config, &filter, false, |_| true)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Completed {
            deleted: 1,
            cache_keys_cleared: 0,
        }
    );
}

#[tokio::test]
async fn batch_size_bounds_each_bulk_request() {
    let backend = MockServer::start().await;
    mount_scroll(
        &backend,
        page(
            "c1",
            vec![
                hit("m1", "7-13"),
                hit("m2", "7-13"),
                hit("m3", "7-13"),
            ],
        ),
        vec![],
    )
    .await;
    mount_bulk(&backend).await;

    let cache = RecordingCache::default();
    let mut config = test_config(&backend);
    config.delete.batch_size = Some(NonZeroUsize::new(2).unwrap());
    let search = SearchClient::from_config(&config.search).unwrap();
    let filter = ConversationFilter::new("7", "13", false);

    let outcome = purge::run(&search, Some(&cache), &config, &filter, false, |_| true)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Completed {
            deleted: 3,
            cache_keys_cleared: 1,
        }
    );

    // Two bounded requests covering every document exactly once,
    // invalidation still issued once at the end.
    let requests = bulk_request_ids(&backend).await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], ["m1", "m2"]);
    assert_eq!(requests[1], ["m3"]);
    assert_eq!(cache.deleted_keys().len(), 1);
}

#[tokio::test]
async fn missing_scroll_id_on_a_nonempty_page_is_an_error() {
    let backend = MockServer::start().await;
    // Hits but no _scroll_id: paging past page one would be impossible,
    // which must fail loudly rather than delete a truncated set.
    Mock::given(method("POST"))
        .and(path("/private-*/_search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "hits": { "hits": [hit("m1", "7-13")] } })),
        )
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&backend)
        .await;

    let cache = RecordingCache::default();
    let config = test_config(&backend);
    let search = SearchClient::from_config(&config.search).unwrap();
    let filter = ConversationFilter::new("7", "13", false);

    let err = purge::run(&search, Some(&cache), &config, &filter, false, |_| true)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("no scroll id"));
    assert!(cache.deleted_keys().is_empty());
}

#[tokio::test]
async fn backend_failure_propagates() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/private-*/_search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("search unavailable"))
        .mount(&backend)
        .await;

    let config = test_config(&backend);
    let search = SearchClient::from_config(&config.search).unwrap();
    let filter = ConversationFilter::new("7", "13", false);

    let err = purge::run(&search, None, &config, &filter, false, |_| true)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("search unavailable"));
}
