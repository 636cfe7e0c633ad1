use fundwatch_rs::{FwEngine, MemoryStore, TrendDirection};

use crate::common::{self, FUND, date, seed};

#[tokio::test]
async fn engine_trends_over_recent_filings() {
    let store = MemoryStore::new();
    seed(&store, "q1", date(2023, 9, 30), &[("TSLA", 10, 100), ("NFLX", 50, 500)]).await;
    seed(&store, "q2", date(2023, 12, 31), &[("TSLA", 20, 250), ("NFLX", 40, 400)]).await;
    seed(&store, "q3", date(2024, 3, 31), &[("TSLA", 30, 400), ("NFLX", 20, 200)]).await;
    seed(&store, "q4", date(2024, 6, 30), &[("TSLA", 40, 600)]).await;

    let summary = common::engine(&store).trends(FUND).await.unwrap();

    let tsla = summary.find("TSLA", TrendDirection::Accumulating).unwrap();
    assert_eq!(tsla.streak_length, 4, "the opening position in q1 counts");
    assert_eq!(tsla.total_value, 600);
    assert_eq!(tsla.latest_date, date(2024, 6, 30));
    assert_eq!(tsla.earliest_date, date(2023, 9, 30));

    let nflx = summary.find("NFLX", TrendDirection::Distributing).unwrap();
    assert_eq!(nflx.streak_length, 3);
    assert_eq!(nflx.total_value, 500);
    assert!(nflx.is_strong);

    assert_eq!(store.read_counts().snapshots_batched, 1);
}

#[tokio::test]
async fn semiannual_filings_do_not_form_streaks() {
    let store = MemoryStore::new();
    seed(&store, "h1", date(2023, 1, 31), &[("AMZN", 10, 100)]).await;
    seed(&store, "h2", date(2023, 7, 31), &[("AMZN", 20, 200)]).await;
    seed(&store, "h3", date(2024, 1, 31), &[("AMZN", 30, 300)]).await;

    let summary = common::engine(&store).trends(FUND).await.unwrap();
    assert!(summary.is_empty());
}

#[tokio::test]
async fn opening_position_then_two_increases_is_a_strong_streak() {
    let store = MemoryStore::new();
    seed(&store, "q1", date(2024, 1, 1), &[("TSLA", 10, 1000)]).await;
    seed(&store, "q2", date(2024, 3, 31), &[("TSLA", 20, 1500)]).await;
    seed(&store, "q3", date(2024, 6, 29), &[("TSLA", 30, 1750)]).await;

    let summary = common::engine(&store).trends(FUND).await.unwrap();

    let tsla = summary.find("TSLA", TrendDirection::Accumulating).unwrap();
    assert_eq!(tsla.streak_length, 3);
    assert!(tsla.is_strong);
    assert_eq!(tsla.total_value, 1750);
    assert_eq!(tsla.earliest_date, date(2024, 1, 1));
}

#[tokio::test]
async fn two_filings_form_a_two_period_streak() {
    let store = MemoryStore::new();
    seed(&store, "q1", date(2024, 3, 31), &[("TSLA", 10, 100)]).await;
    seed(&store, "q2", date(2024, 6, 30), &[("TSLA", 20, 200)]).await;

    let summary = common::engine(&store).trends(FUND).await.unwrap();

    let tsla = summary.find("TSLA", TrendDirection::Accumulating).unwrap();
    assert_eq!(tsla.streak_length, 2);
    assert!(!tsla.is_strong);
}

#[tokio::test]
async fn a_single_filing_skips_the_snapshot_read() {
    let store = MemoryStore::new();
    seed(&store, "q1", date(2024, 3, 31), &[("TSLA", 10, 100)]).await;

    let summary = common::engine(&store).trends(FUND).await.unwrap();
    assert!(summary.is_empty());
    assert_eq!(store.read_counts().snapshots_batched, 0);
}

#[tokio::test]
async fn lookback_limits_the_scanned_filings() {
    let store = MemoryStore::new();
    let dates = [
        date(2023, 3, 31),
        date(2023, 6, 30),
        date(2023, 9, 30),
        date(2023, 12, 31),
        date(2024, 3, 31),
    ];
    for (i, on) in dates.iter().enumerate() {
        let n = i64::try_from(i).unwrap() + 1;
        seed(&store, &format!("q{n}"), *on, &[("META", n * 10, n * 100)]).await;
    }

    let engine = FwEngine::builder()
        .store(store.clone())
        .trend_lookback(3)
        .build()
        .unwrap();
    let summary = engine.trends(FUND).await.unwrap();

    let meta = summary.find("META", TrendDirection::Accumulating).unwrap();
    assert_eq!(
        meta.streak_length, 2,
        "a full window of three filings gives two pairs"
    );
}
