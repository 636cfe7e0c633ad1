use fundwatch_rs::{DeltaAction, FwError, HoldingRow, MemoryStore, PutCall, Snapshot};

use crate::common::{self, FUND, date, seed};

#[tokio::test]
async fn diff_increase_and_new_position() {
    let store = MemoryStore::new();
    seed(&store, "f1", date(2024, 3, 31), &[("AAPL", 100, 1000)]).await;
    seed(
        &store,
        "f2",
        date(2024, 6, 30),
        &[("AAPL", 150, 1500), ("MSFT", 50, 500)],
    )
    .await;

    let set = common::engine(&store).diff(FUND).compute().await.unwrap();

    assert_eq!(set.fund_id, FUND);
    assert_eq!(set.filing_id_new, "f2");
    assert_eq!(set.filing_id_old.as_deref(), Some("f1"));
    assert_eq!(set.len(), 2);

    let aapl = &set.deltas[0];
    assert_eq!(aapl.security_id, "AAPL");
    assert_eq!(aapl.action, DeltaAction::Increase);
    assert_eq!(aapl.shares_old, Some(100));
    assert_eq!(aapl.shares_new, 150);
    assert_eq!(aapl.diff_shares, 50);
    assert_eq!(aapl.diff_value, 500);
    assert_eq!(aapl.diff_shares_pct, Some(50.0));
    assert_eq!(aapl.filing_date_old, Some(date(2024, 3, 31)));

    let msft = &set.deltas[1];
    assert_eq!(msft.security_id, "MSFT");
    assert_eq!(msft.action, DeltaAction::New);
    assert_eq!(msft.shares_old, None);
    assert_eq!(msft.diff_shares, 50);
    assert_eq!(msft.diff_shares_pct, None, "new positions never report a percentage");
}

#[tokio::test]
async fn diff_exit_and_equal_shares_decrease() {
    let store = MemoryStore::new();
    seed(
        &store,
        "f1",
        date(2024, 3, 31),
        &[("IBM", 10, 100), ("KO", 40, 400)],
    )
    .await;
    seed(&store, "f2", date(2024, 6, 30), &[("KO", 40, 380)]).await;

    let set = common::engine(&store).diff(FUND).compute().await.unwrap();

    let ibm = set.deltas.iter().find(|d| d.security_id == "IBM").unwrap();
    assert_eq!(ibm.action, DeltaAction::Exit);
    assert_eq!(ibm.shares_new, 0);
    assert_eq!(ibm.diff_shares, -10);
    assert_eq!(ibm.diff_value, -100);
    assert_eq!(ibm.diff_shares_pct, Some(-100.0));

    let ko = set.deltas.iter().find(|d| d.security_id == "KO").unwrap();
    assert_eq!(ko.action, DeltaAction::Decrease, "unchanged shares count as a decrease");
    assert_eq!(ko.diff_shares, 0);
    assert_eq!(ko.diff_value, -20);
    assert_eq!(ko.diff_shares_pct, Some(0.0));
}

#[tokio::test]
async fn diff_without_prior_filing_reports_everything_new() {
    let store = MemoryStore::new();
    seed(
        &store,
        "f1",
        date(2024, 3, 31),
        &[("AAPL", 100, 1000), ("MSFT", 10, 300)],
    )
    .await;

    let set = common::engine(&store).diff(FUND).compute().await.unwrap();

    assert_eq!(set.filing_id_old, None);
    assert_eq!(set.len(), 2);
    for d in &set.deltas {
        assert_eq!(d.action, DeltaAction::New);
        assert_eq!(d.diff_shares_pct, None);
        assert_eq!(d.filing_id_old, None);
        assert_eq!(d.filing_date_old, None);
    }
}

#[tokio::test]
async fn diff_rejects_an_empty_new_snapshot() {
    let store = MemoryStore::new();
    seed(&store, "f1", date(2024, 3, 31), &[("AAPL", 100, 1000)]).await;
    seed(&store, "f2", date(2024, 6, 30), &[]).await;

    let err = common::engine(&store).diff(FUND).compute().await.unwrap_err();
    assert!(matches!(err, FwError::Data(_)), "got {err:?}");
}

#[tokio::test]
async fn diff_ignores_option_rows() {
    let store = MemoryStore::new();
    seed(&store, "f1", date(2024, 3, 31), &[("AAPL", 100, 1000)]).await;

    let mut call = HoldingRow::new("NVDA", 500, 9000);
    call.put_call = Some(PutCall::Call);
    let new = Snapshot::new(
        "f2",
        vec![HoldingRow::new("AAPL", 120, 1300), call],
    );
    store
        .put_filing(common::filing("f2", date(2024, 6, 30)), new)
        .await;

    let set = common::engine(&store).diff(FUND).compute().await.unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.deltas[0].security_id, "AAPL");
}

#[tokio::test]
async fn diff_merges_rows_of_the_same_security() {
    let store = MemoryStore::new();
    seed(&store, "f1", date(2024, 3, 31), &[("BRK B", 10, 100)]).await;
    seed(
        &store,
        "f2",
        date(2024, 6, 30),
        &[("brk  b", 10, 110), (" BRK B ", 5, 55)],
    )
    .await;

    let set = common::engine(&store).diff(FUND).compute().await.unwrap();
    assert_eq!(set.len(), 1);
    let d = &set.deltas[0];
    assert_eq!(d.security_id, "BRK B");
    assert_eq!(d.action, DeltaAction::Increase);
    assert_eq!(d.shares_new, 15);
    assert_eq!(d.diff_value, 65);
}
