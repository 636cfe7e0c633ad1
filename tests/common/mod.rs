#![allow(dead_code)]

use chrono::NaiveDate;
use fundwatch_rs::{
    Delta, DeltaAction, DeltaSet, Filing, FilingStatus, FwEngine, HoldingRow, MemoryStore,
    SectorRef, Snapshot,
};

pub const FUND: &str = "fund-1";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn filing(id: &str, on: NaiveDate) -> Filing {
    Filing {
        id: id.to_string(),
        fund_id: FUND.to_string(),
        filing_date: on,
        status: FilingStatus::Parsed,
    }
}

pub fn snapshot(filing_id: &str, rows: &[(&str, i64, i64)]) -> Snapshot {
    Snapshot::new(
        filing_id,
        rows.iter()
            .map(|(id, shares, value)| HoldingRow::new(*id, *shares, *value))
            .collect(),
    )
}

/// Adds a parsed filing of [`FUND`] with the given `(security, shares, value)` rows.
pub async fn seed(store: &MemoryStore, id: &str, on: NaiveDate, rows: &[(&str, i64, i64)]) {
    store.put_filing(filing(id, on), snapshot(id, rows)).await;
}

pub async fn seed_sectors(store: &MemoryStore, table: &[(&str, &str)]) {
    store
        .set_sector_reference(
            table
                .iter()
                .map(|(id, sector)| SectorRef::new(*id, *sector))
                .collect(),
        )
        .await;
}

pub fn engine(store: &MemoryStore) -> FwEngine {
    FwEngine::builder()
        .store(store.clone())
        .sink(store.clone())
        .build()
        .unwrap()
}

/// A hand-built delta between `f1` (2024-03-31) and `f2` (2024-06-30).
pub fn delta(id: &str, action: DeltaAction, diff_value: i64) -> Delta {
    let (shares_old, shares_new) = match action {
        DeltaAction::New => (None, 100),
        DeltaAction::Exit => (Some(100), 0),
        DeltaAction::Increase => (Some(100), 150),
        DeltaAction::Decrease => (Some(100), 50),
    };
    let diff_shares = shares_new - shares_old.unwrap_or(0);
    Delta {
        security_id: id.to_string(),
        action,
        shares_old,
        shares_new,
        diff_shares,
        diff_value,
        diff_shares_pct: shares_old
            .filter(|o| *o != 0)
            .map(|o| diff_shares as f64 / o as f64 * 100.0),
        filing_id_new: "f2".to_string(),
        filing_id_old: Some("f1".to_string()),
        filing_date_new: date(2024, 6, 30),
        filing_date_old: Some(date(2024, 3, 31)),
    }
}

pub fn delta_set(deltas: Vec<Delta>) -> DeltaSet {
    DeltaSet {
        fund_id: FUND.to_string(),
        filing_id_new: "f2".to_string(),
        filing_id_old: Some("f1".to_string()),
        deltas,
    }
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
