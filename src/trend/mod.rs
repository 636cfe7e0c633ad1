//! Multi-period accumulation / distribution trends.

mod detect;
mod model;

pub use detect::{MIN_STREAK, TrendParams, detect_streak, detect_trends};
pub use model::{TrendDirection, TrendObservation, TrendRecord, TrendSummary};

use std::collections::{BTreeMap, HashMap};

use crate::core::{EngineConfig, Filing, FwEngine, FwError, Snapshot, SnapshotStore};
use crate::diff::compute_deltas;

impl From<&EngineConfig> for TrendParams {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            max_gap_months: cfg.max_gap_months,
            strong_streak: cfg.strong_streak,
        }
    }
}

/// Builds per-security observation histories by diffing consecutive filings.
///
/// `filings` must be most-recent-first. Pairs whose snapshots are missing from
/// `snapshots` are skipped. When `oldest_is_first` is set the oldest filing is the
/// fund's first one and is diffed against an empty snapshot, so its holdings are
/// observed as `new`; otherwise it only serves as the older side of a pair.
///
/// # Errors
///
/// Returns [`FwError::Data`] if a snapshot is malformed.
pub fn history_from_snapshots(
    fund_id: &str,
    filings: &[Filing],
    snapshots: &HashMap<String, Snapshot>,
    oldest_is_first: bool,
) -> Result<BTreeMap<String, Vec<TrendObservation>>, FwError> {
    let mut history: BTreeMap<String, Vec<TrendObservation>> = BTreeMap::new();
    for (i, new) in filings.iter().enumerate() {
        let Some(new_snap) = snapshots.get(&new.id) else {
            continue;
        };
        let old = match filings.get(i + 1) {
            Some(old) => match snapshots.get(&old.id) {
                Some(old_snap) => Some((old_snap, old.filing_date)),
                None => continue,
            },
            None if oldest_is_first => None,
            None => continue,
        };
        let set = compute_deltas(fund_id, new_snap, new.filing_date, old)?;
        for d in set.deltas {
            history
                .entry(d.security_id)
                .or_default()
                .push(TrendObservation::new(d.action, d.diff_value, d.filing_date_new));
        }
    }
    Ok(history)
}

/// Detects trends from already loaded filings and snapshots.
///
/// # Errors
///
/// Returns [`FwError::Data`] if a snapshot is malformed.
pub fn trends_from_snapshots(
    fund_id: &str,
    filings: &[Filing],
    snapshots: &HashMap<String, Snapshot>,
    oldest_is_first: bool,
    params: TrendParams,
) -> Result<TrendSummary, FwError> {
    let history = history_from_snapshots(fund_id, filings, snapshots, oldest_is_first)?;
    Ok(detect_trends(&history, params))
}

/// Orders filings most-recent-first and keeps parsed ones only, at most `limit`.
pub(crate) fn recent_parsed(mut filings: Vec<Filing>, limit: usize) -> Vec<Filing> {
    filings.retain(Filing::is_parsed);
    filings.sort_by(|a, b| b.filing_date.cmp(&a.filing_date).then_with(|| a.id.cmp(&b.id)));
    filings.truncate(limit);
    filings
}

/// The recent parsed filings trend detection scans, most-recent-first.
pub(crate) struct TrendWindow {
    pub filings: Vec<Filing>,
    /// Fewer filings than the lookback exist, so the oldest is the fund's first.
    pub oldest_is_first: bool,
}

impl TrendWindow {
    pub(crate) async fn read(
        store: &dyn SnapshotStore,
        fund_id: &str,
        lookback: usize,
    ) -> Result<Self, FwError> {
        let filings = recent_parsed(
            store.read_recent_parsed_filings(fund_id, lookback).await?,
            lookback,
        );
        let oldest_is_first = filings.len() < lookback;
        Ok(Self {
            filings,
            oldest_is_first,
        })
    }

    /// Number of filings that yield an observation.
    pub(crate) fn observed(&self) -> usize {
        if self.oldest_is_first {
            self.filings.len()
        } else {
            self.filings.len().saturating_sub(1)
        }
    }
}

pub(crate) async fn load_trends(engine: &FwEngine, fund_id: &str) -> Result<TrendSummary, FwError> {
    let cfg = engine.config();
    let store = engine.store();
    let window = TrendWindow::read(store, fund_id, cfg.effective_lookback()).await?;
    if window.observed() < MIN_STREAK {
        return Ok(TrendSummary::default());
    }
    let ids: Vec<String> = window.filings.iter().map(|f| f.id.clone()).collect();
    let snapshots = store.read_snapshots(&ids).await?;
    trends_from_snapshots(
        fund_id,
        &window.filings,
        &snapshots,
        window.oldest_is_first,
        TrendParams::from(cfg),
    )
}
