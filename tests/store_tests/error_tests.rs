//! Error mapping: undecodable payloads, foreign keys, unsupported clear,
//! backend failures

use kindstore::{Backend, BackendError, ListOptions, Query, Store, StoreError};

use crate::common::{
    ids, memory_store, user, FailingBackend, LeakyScanBackend, NoClearBackend, Org, User,
};

#[tokio::test]
async fn test_get_undecodable_payload_is_decode_error() {
    let store = memory_store();
    store.backend().put(b"user_bad", b"{not json").await.unwrap();

    let err = store.get::<User>("bad").await.unwrap_err();
    match err {
        StoreError::Decode { key, .. } => assert_eq!(key, "user_bad"),
        other => panic!("expected Decode, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_wrong_shape_is_decode_error() {
    let store = memory_store();
    store
        .backend()
        .put(b"user_x", br#"{"id":"x","name":"no age"}"#)
        .await
        .unwrap();

    assert!(matches!(
        store.get::<User>("x").await,
        Err(StoreError::Decode { .. })
    ));
}

#[tokio::test]
async fn test_list_skips_undecodable_records() {
    let store = memory_store();
    store.save(&user("1", 30)).await.unwrap();
    store.backend().put(b"user_2", b"\xff\xfe garbage").await.unwrap();
    store
        .backend()
        .put(b"user_3", br#"{"id":"3","name":"wrong type","age":"old"}"#)
        .await
        .unwrap();
    store.save(&user("4", 40)).await.unwrap();

    let all = store.list::<User>(&ListOptions::new()).await.unwrap();
    assert_eq!(ids(&all), ["1", "4"]);

    // Count skips the same records
    assert_eq!(store.count::<User>(None).await.unwrap(), 2);
    assert_eq!(
        store.count::<User>(Some(&Query::new().gte("age", 35))).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_foreign_key_in_scan_is_corruption() {
    let store = Store::new(LeakyScanBackend::default());
    store.save(&user("1", 30)).await.unwrap();
    store
        .backend()
        .put(b"org_1", br#"{"id":"1","name":"acme","age":9}"#)
        .await
        .unwrap();

    // "org_1" sorts before "user_1", so the user scan trips on it
    let err = store.list::<User>(&ListOptions::new()).await.unwrap_err();
    match err {
        StoreError::Corruption { kind, key } => {
            assert_eq!(kind, "user");
            assert_eq!(key, "org_1");
        }
        other => panic!("expected Corruption, got {other:?}"),
    }

    assert!(matches!(
        store.count::<User>(None).await,
        Err(StoreError::Corruption { .. })
    ));
}

#[tokio::test]
async fn test_clear_without_backend_support_is_unsupported() {
    let store = Store::new(NoClearBackend::default());
    store.save(&user("1", 30)).await.unwrap();

    let err = store.clear().await.unwrap_err();
    assert!(matches!(err, StoreError::Unsupported(_)));

    // Nothing was removed
    assert_eq!(store.get::<User>("1").await.unwrap().age, 30);
}

#[tokio::test]
async fn test_kind_with_separator_is_rejected() {
    let store = memory_store();

    assert!(matches!(
        store.get_document("bad_kind", "1").await,
        Err(StoreError::InvalidKind(_))
    ));
    assert!(matches!(
        store.list_documents("", &ListOptions::new()).await,
        Err(StoreError::InvalidKind(_))
    ));
}

#[tokio::test]
async fn test_get_from_unused_kind_is_not_found() {
    let store = memory_store();
    store.save(&user("1", 30)).await.unwrap();

    assert!(store.get::<Org>("1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_backend_failure_surfaces_unchanged() {
    let store = Store::new(FailingBackend);

    let err = store.get::<User>("1").await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(BackendError::Storage(_))));
    assert!(!err.is_not_found());

    let err = store.list::<User>(&ListOptions::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(BackendError::Storage(_))));

    let err = store.count::<User>(None).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(BackendError::Storage(_))));

    let err = store.save(&user("1", 30)).await.unwrap_err();
    match err {
        StoreError::Backend(BackendError::Storage(msg)) => assert_eq!(msg, "disk gone"),
        other => panic!("expected Backend(Storage), got {other:?}"),
    }
}
