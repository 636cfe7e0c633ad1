use fundwatch_rs::{DeltaAction, Filing, FilingStatus, FwEngine, FwError, MemoryStore};

use crate::common::{self, FUND, date, seed, snapshot};

async fn three_quarters() -> MemoryStore {
    let store = MemoryStore::new();
    seed(&store, "f1", date(2024, 3, 31), &[("AAPL", 100, 1000)]).await;
    seed(&store, "f2", date(2024, 6, 30), &[("AAPL", 120, 1300)]).await;
    seed(&store, "f3", date(2024, 9, 30), &[("AAPL", 90, 1000)]).await;
    store
}

#[tokio::test]
async fn latest_pair_is_the_default() {
    let store = three_quarters().await;
    let set = common::engine(&store).diff(FUND).compute().await.unwrap();
    assert_eq!(set.filing_id_new, "f3");
    assert_eq!(set.filing_id_old.as_deref(), Some("f2"));
}

#[tokio::test]
async fn pinned_new_filing_compares_with_its_predecessor() {
    let store = three_quarters().await;
    let set = common::engine(&store)
        .diff(FUND)
        .new_filing("f2")
        .compute()
        .await
        .unwrap();
    assert_eq!(set.filing_id_new, "f2");
    assert_eq!(set.filing_id_old.as_deref(), Some("f1"));
    assert_eq!(set.deltas[0].diff_value, 300);
}

#[tokio::test]
async fn predecessor_does_not_depend_on_trend_lookback() {
    let store = three_quarters().await;
    let engine = FwEngine::builder()
        .store(store.clone())
        .trend_lookback(2)
        .build()
        .unwrap();

    let set = engine.diff(FUND).new_filing("f2").compute().await.unwrap();

    assert_eq!(set.filing_id_old.as_deref(), Some("f1"));
    assert_eq!(set.deltas[0].action, DeltaAction::Increase);
}

#[tokio::test]
async fn predecessor_beyond_the_recent_window_is_not_guessed() {
    let store = MemoryStore::new();
    for i in 0..9u32 {
        seed(
            &store,
            &format!("q{i}"),
            date(2022, 1, 31) + chrono::Months::new(3 * i),
            &[("AAPL", 100 + i64::from(i), 1000)],
        )
        .await;
    }

    let err = common::engine(&store)
        .diff(FUND)
        .new_filing("q1")
        .compute()
        .await
        .unwrap_err();
    assert!(matches!(err, FwError::NotFound(_)), "got {err:?}");

    let set = common::engine(&store)
        .diff(FUND)
        .new_filing("q1")
        .old_filing("q0")
        .compute()
        .await
        .unwrap();
    assert_eq!(set.deltas[0].action, DeltaAction::Increase);

    let set = common::engine(&store)
        .diff(FUND)
        .new_filing("q2")
        .compute()
        .await
        .unwrap();
    assert_eq!(set.filing_id_old.as_deref(), Some("q1"));
}

#[tokio::test]
async fn explicit_old_filing_may_skip_periods() {
    let store = three_quarters().await;
    let set = common::engine(&store)
        .diff(FUND)
        .old_filing("f1")
        .compute()
        .await
        .unwrap();
    assert_eq!(set.filing_id_new, "f3");
    assert_eq!(set.filing_id_old.as_deref(), Some("f1"));
    assert_eq!(set.deltas[0].diff_shares, -10);
}

#[tokio::test]
async fn old_filing_must_be_older() {
    let store = three_quarters().await;
    let err = common::engine(&store)
        .diff(FUND)
        .new_filing("f2")
        .old_filing("f3")
        .compute()
        .await
        .unwrap_err();
    assert!(matches!(err, FwError::InvalidParams(_)), "got {err:?}");
}

#[tokio::test]
async fn date_range_picks_the_newest_filing_inside_it() {
    let store = three_quarters().await;
    let set = common::engine(&store)
        .diff(FUND)
        .between(date(2024, 1, 1), date(2024, 7, 31))
        .compute()
        .await
        .unwrap();
    assert_eq!(set.filing_id_new, "f2");
    assert_eq!(set.filing_id_old.as_deref(), Some("f1"));
}

#[tokio::test]
async fn inverted_date_range_is_rejected() {
    let store = three_quarters().await;
    let err = common::engine(&store)
        .diff(FUND)
        .between(date(2024, 12, 31), date(2024, 1, 1))
        .compute()
        .await
        .unwrap_err();
    assert!(matches!(err, FwError::InvalidDates), "got {err:?}");
}

#[tokio::test]
async fn empty_date_range_is_not_found() {
    let store = three_quarters().await;
    let err = common::engine(&store)
        .diff(FUND)
        .between(date(2023, 1, 1), date(2023, 12, 31))
        .compute()
        .await
        .unwrap_err();
    assert!(matches!(err, FwError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn fund_without_filings_is_not_found() {
    let store = MemoryStore::new();
    let err = common::engine(&store).diff(FUND).compute().await.unwrap_err();
    assert!(matches!(err, FwError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn unknown_pinned_filing_is_not_found() {
    let store = three_quarters().await;
    let err = common::engine(&store)
        .diff(FUND)
        .new_filing("nope")
        .compute()
        .await
        .unwrap_err();
    assert!(matches!(err, FwError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn pinned_filing_of_another_fund_is_rejected() {
    let store = three_quarters().await;
    let foreign = Filing {
        id: "g1".into(),
        fund_id: "fund-2".into(),
        filing_date: date(2024, 9, 30),
        status: FilingStatus::Parsed,
    };
    store
        .put_filing(foreign, snapshot("g1", &[("AAPL", 1, 1)]))
        .await;

    let err = common::engine(&store)
        .diff(FUND)
        .new_filing("g1")
        .compute()
        .await
        .unwrap_err();
    assert!(matches!(err, FwError::InvalidParams(_)), "got {err:?}");
}

#[tokio::test]
async fn unparsed_filings_are_never_used() {
    let store = three_quarters().await;
    let mut pending = common::filing("f4", date(2024, 12, 31));
    pending.status = FilingStatus::Pending;
    store.put_filing_only(pending).await;

    let engine = common::engine(&store);
    let set = engine.diff(FUND).compute().await.unwrap();
    assert_eq!(set.filing_id_new, "f3", "pending filing must be skipped");

    let err = engine.diff(FUND).new_filing("f4").compute().await.unwrap_err();
    assert!(matches!(err, FwError::InvalidParams(_)), "got {err:?}");
}

#[tokio::test]
async fn store_failures_propagate() {
    let store = three_quarters().await;
    store.fail_reads(Some("connection reset")).await;

    let err = common::engine(&store).diff(FUND).compute().await.unwrap_err();
    match err {
        FwError::Store(msg) => assert_eq!(msg, "connection reset"),
        other => panic!("expected Store error, got {other:?}"),
    }
}

#[tokio::test]
async fn diff_uses_one_batched_snapshot_read() {
    let store = three_quarters().await;
    common::engine(&store).diff(FUND).compute().await.unwrap();

    let counts = store.read_counts();
    assert_eq!(counts.snapshots_batched, 1);
    assert_eq!(counts.snapshot, 0);
    assert_eq!(counts.recent_filings, 1);
}
