//! Schemaless API: kinds named at runtime

use kindstore::{Direction, ListOptions, Query};
use serde_json::json;

use crate::common::{memory_store, org, user, user_in};

#[tokio::test]
async fn test_get_document_returns_stored_json() {
    let store = memory_store();
    store.save(&user_in("1", 30, "core")).await.unwrap();

    let doc = store.get_document("user", "1").await.unwrap();

    assert_eq!(
        doc,
        json!({ "id": "1", "name": "user 1", "age": 30, "team": "core" })
    );
    assert!(store
        .get_document("user", "2")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_list_documents_filters_and_sorts() {
    let store = memory_store();
    store.save(&user("1", 30)).await.unwrap();
    store.save(&user("2", 25)).await.unwrap();
    store.save(&user("3", 35)).await.unwrap();

    let options = ListOptions::new()
        .query(Query::parse(r#"{"age": {"gte": 30}}"#).unwrap())
        .order_by("age", Direction::Desc);
    let docs = store.list_documents("user", &options).await.unwrap();

    let ids: Vec<_> = docs.iter().map(|d| d["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["3", "1"]);
    assert_eq!(
        store
            .count_documents("user", options.query.as_ref())
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_delete_by_id() {
    let store = memory_store();
    store.save(&user("1", 30)).await.unwrap();

    store.delete_by_id("user", "1").await.unwrap();
    store.delete_by_id("user", "1").await.unwrap();

    assert_eq!(store.count_documents("user", None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_kinds_counts_each_partition() {
    let store = memory_store();
    store.save(&user("1", 30)).await.unwrap();
    store.save(&user("2", 25)).await.unwrap();
    store.save(&org("1", 99)).await.unwrap();

    let kinds = store.kinds().await.unwrap();

    assert_eq!(kinds.len(), 2);
    assert_eq!(kinds["user"], 2);
    assert_eq!(kinds["org"], 1);
}
