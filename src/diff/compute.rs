use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::core::conversions::shares_change_pct;
use crate::core::{Delta, DeltaAction, DeltaSet, FwError, Snapshot};
use crate::sector::normalize_security_id;

#[derive(Debug, Clone, Copy, Default)]
struct Position {
    shares: i64,
    value: i64,
}

/// Collapses equity rows into one position per normalized security id.
///
/// Rows repeating the same security (after normalization) are summed.
fn positions(snapshot: &Snapshot) -> Result<BTreeMap<String, Position>, FwError> {
    let mut out: BTreeMap<String, Position> = BTreeMap::new();
    for row in snapshot.equity_rows() {
        let id = normalize_security_id(&row.security_id);
        if id.is_empty() {
            return Err(FwError::Data(format!(
                "snapshot {} has a row without a security id",
                snapshot.filing_id
            )));
        }
        let p = out.entry(id).or_default();
        p.shares = p.shares.saturating_add(row.shares);
        p.value = p.value.saturating_add(row.market_value);
    }
    Ok(out)
}

fn classify(old: Option<Position>, new: Option<Position>) -> Option<DeltaAction> {
    match (old, new) {
        (None, Some(_)) => Some(DeltaAction::New),
        (Some(_), None) => Some(DeltaAction::Exit),
        (Some(o), Some(n)) if n.shares > o.shares => Some(DeltaAction::Increase),
        (Some(_), Some(_)) => Some(DeltaAction::Decrease),
        (None, None) => None,
    }
}

/// Computes one [`Delta`] per security present in either snapshot.
///
/// `old` is the prior snapshot with its filing date; pass `None` when no prior filing
/// could be resolved and every security is reported as `new`. The output is ordered by
/// security id and depends on nothing but the arguments.
///
/// # Errors
///
/// Returns [`FwError::Data`] if a snapshot row has a blank security id.
pub fn compute_deltas(
    fund_id: &str,
    new: &Snapshot,
    filing_date_new: NaiveDate,
    old: Option<(&Snapshot, NaiveDate)>,
) -> Result<DeltaSet, FwError> {
    let new_pos = positions(new)?;
    let old_pos = match old {
        Some((snap, _)) => positions(snap)?,
        None => BTreeMap::new(),
    };
    let filing_id_old = old.map(|(s, _)| s.filing_id.clone());
    let filing_date_old = old.map(|(_, d)| d);

    let mut keys: Vec<&String> = new_pos.keys().chain(old_pos.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut deltas = Vec::with_capacity(keys.len());
    for id in keys {
        let o = old_pos.get(id).copied();
        let n = new_pos.get(id).copied();
        let Some(action) = classify(o, n) else {
            continue;
        };

        let shares_old = o.map(|p| p.shares);
        let shares_new = n.map_or(0, |p| p.shares);
        let diff_shares = shares_new - shares_old.unwrap_or(0);
        let diff_value = n.map_or(0, |p| p.value) - o.map_or(0, |p| p.value);

        deltas.push(Delta {
            security_id: id.clone(),
            action,
            shares_old,
            shares_new,
            diff_shares,
            diff_value,
            diff_shares_pct: shares_change_pct(diff_shares, shares_old),
            filing_id_new: new.filing_id.clone(),
            filing_id_old: filing_id_old.clone(),
            filing_date_new,
            filing_date_old,
        });
    }

    Ok(DeltaSet {
        fund_id: fund_id.to_string(),
        filing_id_new: new.filing_id.clone(),
        filing_id_old,
        deltas,
    })
}
