//! LocalFileStore against fixture files.

use std::cmp::Ordering;
use std::fs;
use std::sync::Arc;

use postshelf::{locale_compare, LocalFileStore, PostLookup, PostStore, StoreError};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

fn fixture(records: &Value) -> (TempDir, LocalFileStore) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("posts.json"), records.to_string()).unwrap();
    let store = LocalFileStore::new(dir.path());
    (dir, store)
}

fn blog() -> Value {
    json!([
        {"id": 3, "title": "Zucchini season", "date": "2022-08-01", "author": "C",
         "contentHtml": "<p>z</p>"},
        {"id": "intro", "title": "hello world", "date": "2019-05-05", "author": "A"},
        {"id": 7, "title": "Écrire en Rust", "date": "2023-01-01", "author": "B"},
        {"id": 1.0, "title": "apple pie", "date": "2020-01-01", "author": "D",
         "tags": ["food"]},
        {"id": 12, "title": "Apple Pie", "date": "2021-03-03", "author": "E"}
    ])
}

#[tokio::test]
async fn test_worked_example() {
    let (_dir, store) = fixture(&json!([
        {"id": 2, "title": "Banana", "date": "2021-01-01", "author": "A"},
        {"id": 1, "title": "Apple", "date": "2020-01-01", "author": "B"}
    ]));

    let listed = assert_ok!(store.list_sorted().await);
    assert_eq!(
        serde_json::to_value(&listed).unwrap(),
        json!([
            {"id": "1", "title": "Apple", "date": "2020-01-01", "author": "B"},
            {"id": "2", "title": "Banana", "date": "2021-01-01", "author": "A"}
        ])
    );

    let found = assert_ok!(store.get_by_id("1").await);
    assert_eq!(
        serde_json::to_value(&found).unwrap(),
        json!({"id": 1, "title": "Apple", "date": "2020-01-01", "author": "B"})
    );

    let missing = assert_ok!(store.get_by_id("9").await);
    assert_eq!(
        serde_json::to_value(&missing).unwrap(),
        json!({"id": "9", "title": "Not found", "date": "", "contentHtml": "Not found"})
    );
}

#[tokio::test]
async fn test_list_sorted_is_ordered_by_title() {
    let (_dir, store) = fixture(&blog());
    let listed = assert_ok!(store.list_sorted().await);

    assert_eq!(listed.len(), 5);
    for pair in listed.windows(2) {
        assert_ne!(
            locale_compare(&pair[0].title, &pair[1].title),
            Ordering::Greater,
            "{:?} sorted after {:?}",
            pair[0].title,
            pair[1].title
        );
    }
    let titles: Vec<&str> = listed.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["apple pie", "Apple Pie", "Écrire en Rust", "hello world", "Zucchini season"]
    );
}

#[tokio::test]
async fn test_list_sorted_exposes_only_listing_keys() {
    let (_dir, store) = fixture(&blog());
    let listed = serde_json::to_value(assert_ok!(store.list_sorted().await)).unwrap();

    for item in listed.as_array().unwrap() {
        for key in item.as_object().unwrap().keys() {
            assert!(
                ["id", "title", "date", "author"].contains(&key.as_str()),
                "unexpected key {key}"
            );
        }
        assert!(item["id"].is_string());
    }
}

#[tokio::test]
async fn test_list_identifiers_covers_every_post() {
    let (_dir, store) = fixture(&blog());
    let paths = assert_ok!(store.list_identifiers().await);

    let mut ids: Vec<&str> = paths.iter().map(|p| p.id()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["1", "12", "3", "7", "intro"]);
    assert_eq!(
        serde_json::to_value(&paths[0]).unwrap(),
        json!({"params": {"id": "3"}})
    );
}

#[tokio::test]
async fn test_get_by_id_returns_full_record_for_each_post() {
    let records = blog();
    let (_dir, store) = fixture(&records);

    for path in assert_ok!(store.list_identifiers().await) {
        let lookup = assert_ok!(store.get_by_id(path.id()).await);
        let post = lookup.post().expect("listed id must be found");
        assert_eq!(post.key(), path.id());

        let stored = records
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["title"] == json!(post.title))
            .unwrap();
        assert_eq!(&serde_json::to_value(post).unwrap(), stored);
    }
}

#[tokio::test]
async fn test_get_by_id_coerces_numeric_ids() {
    let (_dir, store) = fixture(&blog());

    let lookup = assert_ok!(store.get_by_id("1").await);
    assert_eq!(lookup.title(), "apple pie");
    assert_eq!(lookup.post().unwrap().extra["tags"], json!(["food"]));

    // "1.0" is not how the stored number renders
    assert!(!assert_ok!(store.get_by_id("1.0").await).is_found());
}

#[tokio::test]
async fn test_get_by_id_first_match_wins() {
    let (_dir, store) = fixture(&json!([
        {"id": 5, "title": "First"},
        {"id": "5", "title": "Second"}
    ]));
    let lookup = assert_ok!(store.get_by_id("5").await);
    assert_eq!(lookup.title(), "First");
}

#[tokio::test]
async fn test_not_found_echoes_requested_id() {
    let (_dir, store) = fixture(&blog());
    match assert_ok!(store.get_by_id("no-such-post").await) {
        PostLookup::NotFound(placeholder) => {
            assert_eq!(placeholder.id, "no-such-post");
            assert_eq!(placeholder.title, "Not found");
            assert_eq!(placeholder.date, "");
            assert_eq!(placeholder.content_html, "Not found");
        }
        PostLookup::Found(post) => panic!("unexpected post {post:?}"),
    }
}

#[tokio::test]
async fn test_queries_are_idempotent() {
    let (_dir, store) = fixture(&blog());

    assert_eq!(
        assert_ok!(store.list_sorted().await),
        assert_ok!(store.list_sorted().await)
    );
    assert_eq!(
        assert_ok!(store.list_identifiers().await),
        assert_ok!(store.list_identifiers().await)
    );
    assert_eq!(
        assert_ok!(store.get_by_id("7").await),
        assert_ok!(store.get_by_id("7").await)
    );
}

#[tokio::test]
async fn test_rereads_file_on_every_call() {
    let (dir, store) = fixture(&json!([{"id": 1, "title": "Old"}]));
    assert_eq!(assert_ok!(store.get_by_id("1").await).title(), "Old");

    fs::write(
        dir.path().join("posts.json"),
        json!([{"id": 1, "title": "New"}]).to_string(),
    )
    .unwrap();
    assert_eq!(assert_ok!(store.get_by_id("1").await).title(), "New");
}

#[tokio::test]
async fn test_file_removed_between_calls_fails() {
    let (dir, store) = fixture(&blog());
    assert_ok!(store.list_identifiers().await);

    fs::remove_file(dir.path().join("posts.json")).unwrap();
    let err = assert_err!(store.list_identifiers().await);
    assert!(matches!(err, StoreError::Io { .. }));
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let (_dir, store) = fixture(&blog());
    let store: Arc<dyn PostStore> = Arc::new(store);

    let lookups = futures::future::join_all(
        ["1", "3", "7", "12", "intro", "missing"]
            .into_iter()
            .map(|id| {
                let store = Arc::clone(&store);
                async move { store.get_by_id(id).await }
            }),
    )
    .await;

    let found: Vec<bool> = lookups
        .into_iter()
        .map(|r| r.unwrap().is_found())
        .collect();
    assert_eq!(found, vec![true, true, true, true, true, false]);
}

#[tokio::test]
async fn test_get_by_id_keeps_null_fields() {
    let stored = json!({"id": 1, "title": "A", "date": null, "author": "B"});
    let (_dir, store) = fixture(&json!([stored.clone()]));

    let lookup = assert_ok!(store.get_by_id("1").await);
    assert_eq!(serde_json::to_value(&lookup).unwrap(), stored);
}

#[tokio::test]
async fn test_mistyped_optional_field_does_not_poison_file() {
    let (_dir, store) = fixture(&json!([
        {"id": 1, "title": "A", "author": 7},
        {"id": 2, "title": "B"}
    ]));

    assert_eq!(assert_ok!(store.list_identifiers().await).len(), 2);
    assert_eq!(assert_ok!(store.get_by_id("2").await).title(), "B");

    let first = assert_ok!(store.get_by_id("1").await);
    assert_eq!(first.post().unwrap().extra["author"], json!(7));

    let listed = serde_json::to_value(assert_ok!(store.list_sorted().await)).unwrap();
    assert_eq!(listed, json!([{"id": "1", "title": "A"}, {"id": "2", "title": "B"}]));
}

#[tokio::test]
async fn test_negative_zero_id_renders_as_zero() {
    let (_dir, store) = fixture(&json!([{"id": -0.0, "title": "Zero"}]));

    let paths = assert_ok!(store.list_identifiers().await);
    assert_eq!(paths[0].id(), "0");
    assert!(assert_ok!(store.get_by_id("0").await).is_found());
}
