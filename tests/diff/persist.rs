use fundwatch_rs::{FwEngine, MemoryStore};

use crate::common::{self, FUND, date, seed};

async fn two_quarters() -> MemoryStore {
    let store = MemoryStore::new();
    seed(&store, "f1", date(2024, 3, 31), &[("AAPL", 100, 1000)]).await;
    seed(
        &store,
        "f2",
        date(2024, 6, 30),
        &[("AAPL", 150, 1500), ("MSFT", 50, 500)],
    )
    .await;
    store
}

#[tokio::test]
async fn persisted_deltas_match_the_returned_set() {
    let store = two_quarters().await;
    let set = common::engine(&store)
        .diff(FUND)
        .persist(true)
        .compute()
        .await
        .unwrap();

    assert_eq!(store.deltas(FUND, "f2").await, Some(set));
}

#[tokio::test]
async fn no_persistence_unless_requested() {
    let store = two_quarters().await;
    common::engine(&store).diff(FUND).compute().await.unwrap();
    assert_eq!(store.deltas(FUND, "f2").await, None);
}

#[tokio::test]
async fn recomputing_replaces_previous_deltas() {
    let store = two_quarters().await;
    let engine = common::engine(&store);
    engine.diff(FUND).persist(true).compute().await.unwrap();

    // a re-parse of f2 drops MSFT
    seed(&store, "f2", date(2024, 6, 30), &[("AAPL", 150, 1500)]).await;
    let second = engine.diff(FUND).persist(true).compute().await.unwrap();

    let stored = store.deltas(FUND, "f2").await.unwrap();
    assert_eq!(stored, second);
    assert_eq!(stored.len(), 1);
    assert!(stored.deltas.iter().all(|d| d.security_id != "MSFT"));
}

#[tokio::test]
async fn sink_failure_does_not_fail_the_diff() {
    let store = two_quarters().await;
    store.fail_writes(Some("disk full")).await;

    let set = common::engine(&store)
        .diff(FUND)
        .persist(true)
        .compute()
        .await
        .unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(store.deltas(FUND, "f2").await, None);
}

#[tokio::test]
async fn persist_without_sink_is_a_no_op() {
    let store = two_quarters().await;
    let engine = FwEngine::builder().store(store.clone()).build().unwrap();

    let set = engine.diff(FUND).persist(true).compute().await.unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(store.deltas(FUND, "f2").await, None);
}
