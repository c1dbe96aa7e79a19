//! list / count: filtering, sorting, pagination

use kindstore::{Backend, Direction, ListOptions, Query};

use crate::common::{ids, memory_store, org, user, user_in, Account, Org, User};

#[tokio::test]
async fn test_list_scenario_orders_filters_and_counts() {
    let store = memory_store();
    store.save(&user("1", 30)).await.unwrap();
    store.save(&user("2", 25)).await.unwrap();
    store.save(&org("1", 99)).await.unwrap();

    let by_age = store
        .list::<User>(&ListOptions::new().order_by("age", Direction::Asc))
        .await
        .unwrap();
    assert_eq!(ids(&by_age), ["2", "1"]);

    let older = store
        .list::<User>(&ListOptions::new().query(Query::new().gte("age", 30)))
        .await
        .unwrap();
    assert_eq!(ids(&older), ["1"]);

    assert_eq!(store.count::<Org>(None).await.unwrap(), 1);
    assert_eq!(store.count::<User>(None).await.unwrap(), 2);
}

#[tokio::test]
async fn test_list_without_options_is_key_order() {
    let store = memory_store();
    for id in ["c", "a", "b"] {
        store.save(&user(id, 1)).await.unwrap();
    }

    let all = store.list::<User>(&ListOptions::new()).await.unwrap();
    assert_eq!(ids(&all), ["a", "b", "c"]);
}

#[tokio::test]
async fn test_list_only_returns_own_kind() {
    let store = memory_store();
    store.save(&user("1", 30)).await.unwrap();
    store.save(&org("1", 30)).await.unwrap();
    store.save(&org("2", 30)).await.unwrap();

    let users = store.list::<User>(&ListOptions::new()).await.unwrap();
    let orgs = store.list::<Org>(&ListOptions::new()).await.unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(orgs.len(), 2);
}

#[tokio::test]
async fn test_filter_equality_and_membership() {
    let store = memory_store();
    store.save(&user_in("1", 30, "core")).await.unwrap();
    store.save(&user_in("2", 40, "infra")).await.unwrap();
    store.save(&user_in("3", 50, "sales")).await.unwrap();

    let core = store
        .list::<User>(&ListOptions::new().query(Query::new().eq("team", "core")))
        .await
        .unwrap();
    assert_eq!(ids(&core), ["1"]);

    let eng = store
        .list::<User>(&ListOptions::new().query(Query::new().is_in("team", ["core", "infra"])))
        .await
        .unwrap();
    assert_eq!(ids(&eng), ["1", "2"]);
}

#[tokio::test]
async fn test_filter_range() {
    let store = memory_store();
    for (id, age) in [("1", 20), ("2", 30), ("3", 40), ("4", 50)] {
        store.save(&user(id, age)).await.unwrap();
    }

    let query = Query::new().gt("age", 20).lte("age", 40);
    let mid = store
        .list::<User>(&ListOptions::new().query(query))
        .await
        .unwrap();
    assert_eq!(ids(&mid), ["2", "3"]);
}

#[tokio::test]
async fn test_filter_on_missing_field_excludes_record() {
    let store = memory_store();
    store.save(&user_in("1", 30, "core")).await.unwrap();
    store.save(&user("2", 30)).await.unwrap();

    let not_core = store
        .list::<User>(&ListOptions::new().query(Query::new().ne("team", "core")))
        .await
        .unwrap();
    assert!(not_core.is_empty());

    let teamless = store
        .list::<User>(&ListOptions::new().query(Query::new().exists("team", false)))
        .await
        .unwrap();
    assert_eq!(ids(&teamless), ["2"]);
}

#[tokio::test]
async fn test_descending_is_reverse_of_ascending_for_distinct_keys() {
    let store = memory_store();
    for (id, age) in [("a", 33), ("b", 11), ("c", 55), ("d", 22)] {
        store.save(&user(id, age)).await.unwrap();
    }

    let asc = store
        .list::<User>(&ListOptions::new().order_by("age", Direction::Asc))
        .await
        .unwrap();
    let desc = store
        .list::<User>(&ListOptions::new().order_by("age", Direction::Desc))
        .await
        .unwrap();

    assert_eq!(ids(&asc), ["b", "d", "a", "c"]);
    let mut reversed = ids(&asc);
    reversed.reverse();
    assert_eq!(ids(&desc), reversed);
}

#[tokio::test]
async fn test_sort_ties_keep_scan_order() {
    let store = memory_store();
    store.save(&user("1", 30)).await.unwrap();
    store.save(&user("2", 20)).await.unwrap();
    store.save(&user("3", 30)).await.unwrap();
    store.save(&user("4", 20)).await.unwrap();

    let asc = store
        .list::<User>(&ListOptions::new().order_by("age", Direction::Asc))
        .await
        .unwrap();
    assert_eq!(ids(&asc), ["2", "4", "1", "3"]);

    let desc = store
        .list::<User>(&ListOptions::new().order_by("age", Direction::Desc))
        .await
        .unwrap();
    assert_eq!(ids(&desc), ["1", "3", "2", "4"]);
}

#[tokio::test]
async fn test_sort_missing_field_first() {
    let store = memory_store();
    store.save(&user_in("1", 1, "zeta")).await.unwrap();
    store.save(&user("2", 1)).await.unwrap();
    store.save(&user_in("3", 1, "alpha")).await.unwrap();

    let sorted = store
        .list::<User>(&ListOptions::new().order_by("team", Direction::Asc))
        .await
        .unwrap();
    assert_eq!(ids(&sorted), ["2", "3", "1"]);
}

#[tokio::test]
async fn test_pagination_slices_after_sort() {
    let store = memory_store();
    for i in 0..8u32 {
        // Ages run opposite to key order
        store.save(&user(&format!("{i}"), 100 - i)).await.unwrap();
    }

    let page = store
        .list::<User>(
            &ListOptions::new()
                .order_by("age", Direction::Asc)
                .offset(2)
                .limit(3),
        )
        .await
        .unwrap();

    assert_eq!(ids(&page), ["5", "4", "3"]);
}

#[tokio::test]
async fn test_pagination_bounds() {
    let store = memory_store();
    for i in 0..6u32 {
        store.save(&user(&format!("{i}"), i)).await.unwrap();
    }

    let beyond = store
        .list::<User>(&ListOptions::new().offset(10))
        .await
        .unwrap();
    assert!(beyond.is_empty());

    let tail = store
        .list::<User>(&ListOptions::new().offset(4).limit(10))
        .await
        .unwrap();
    assert_eq!(ids(&tail), ["4", "5"]);

    let none = store
        .list::<User>(&ListOptions::new().limit(0))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_count_matches_list_length() {
    let store = memory_store();
    for i in 0..10u32 {
        store.save(&user(&format!("{i}"), i * 10)).await.unwrap();
    }

    for query in [
        Query::new(),
        Query::new().gte("age", 50),
        Query::new().eq("age", 30),
        Query::new().lt("age", 0),
    ] {
        let listed = store
            .list::<User>(&ListOptions::new().query(query.clone()))
            .await
            .unwrap();
        let counted = store.count::<User>(Some(&query)).await.unwrap();
        assert_eq!(listed.len(), counted);
    }
}

#[tokio::test]
async fn test_count_on_empty_kind_is_zero() {
    let store = memory_store();
    store.save(&user("1", 30)).await.unwrap();

    assert_eq!(store.count::<Org>(None).await.unwrap(), 0);
    assert!(store.list::<Org>(&ListOptions::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_typed_query_sees_decoded_defaults() {
    let store = memory_store();
    store.backend().put(b"account_1", br#"{"id":"1"}"#).await.unwrap();
    store
        .save(&Account {
            id: "2".to_string(),
            plan: "pro".to_string(),
        })
        .await
        .unwrap();

    let free = Query::new().eq("plan", "free");
    let accounts = store
        .list::<Account>(&ListOptions::new().query(free.clone()))
        .await
        .unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id, "1");
    assert_eq!(store.count::<Account>(Some(&free)).await.unwrap(), 1);

    let by_plan = store
        .list::<Account>(&ListOptions::new().order_by("plan", Direction::Desc))
        .await
        .unwrap();
    let plans: Vec<_> = by_plan.iter().map(|a| a.plan.as_str()).collect();
    assert_eq!(plans, ["pro", "free"]);

    // The schemaless view matches the stored JSON, which has no plan
    assert_eq!(store.count_documents("account", Some(&free)).await.unwrap(), 0);
}
