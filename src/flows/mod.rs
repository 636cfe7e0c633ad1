//! Sector-level capital flows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::conversions::pct_of;
use crate::sector::UNKNOWN_SECTOR;
use crate::strategic::StrategicDelta;

/// Number of movements kept per sector.
pub const TOP_MOVEMENTS: usize = 3;

/// Aggregated capital movement of one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorFlow {
    pub sector: String,
    /// Σ|diff_value| of `new` and `increase` members.
    pub inflow: i64,
    /// Σ|diff_value| of `exit` and `decrease` members.
    pub outflow: i64,
    /// `inflow - outflow`.
    pub net_flow: i64,
    /// `net_flow` in percent of the portfolio total; zero for a zero total.
    pub net_flow_pct: f64,
    pub security_count: usize,
    /// Up to three members with the largest portfolio impact.
    pub top_movements: Vec<StrategicDelta>,
}

/// Flows of every sector plus the derived flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorFlows {
    /// Every sector including `"Unknown"`, by `|net_flow|` descending.
    pub all: Vec<SectorFlow>,
    /// Same as `all` without the `"Unknown"` sector.
    pub filtered: Vec<SectorFlow>,
    /// Some named sector moved at least the rotation threshold.
    pub rotation_detected: bool,
    /// `filtered` is empty although `all` is not.
    pub has_only_unknown_sectors: bool,
}

impl SectorFlows {
    /// Sum of `net_flow` over all sectors.
    #[must_use]
    pub fn total_net_flow(&self) -> i64 {
        self.all.iter().map(|f| f.net_flow).sum()
    }
}

/// Groups deltas by sector and sums their flows.
///
/// Deltas without a sector land in `"Unknown"`.
#[must_use]
pub fn aggregate_sector_flows(
    deltas: &[StrategicDelta],
    total_portfolio_value: i64,
    rotation_threshold_pct: f64,
) -> SectorFlows {
    let mut groups: BTreeMap<&str, Vec<&StrategicDelta>> = BTreeMap::new();
    for d in deltas {
        let sector = d.sector.as_deref().unwrap_or(UNKNOWN_SECTOR);
        groups.entry(sector).or_default().push(d);
    }

    let mut all: Vec<SectorFlow> = groups
        .into_iter()
        .map(|(sector, members)| sector_flow(sector, members, total_portfolio_value))
        .collect();
    all.sort_by(|a, b| {
        b.net_flow
            .unsigned_abs()
            .cmp(&a.net_flow.unsigned_abs())
            .then_with(|| a.sector.cmp(&b.sector))
    });

    let filtered: Vec<SectorFlow> = all
        .iter()
        .filter(|f| f.sector != UNKNOWN_SECTOR)
        .cloned()
        .collect();
    let rotation_detected = filtered
        .iter()
        .any(|f| f.net_flow_pct.abs() >= rotation_threshold_pct);
    let has_only_unknown_sectors = filtered.is_empty() && !all.is_empty();

    SectorFlows {
        all,
        filtered,
        rotation_detected,
        has_only_unknown_sectors,
    }
}

fn sector_flow(sector: &str, mut members: Vec<&StrategicDelta>, total: i64) -> SectorFlow {
    let mut inflow: i64 = 0;
    let mut outflow: i64 = 0;
    for d in &members {
        let v = d.delta.diff_value.saturating_abs();
        if d.delta.action.is_inflow() {
            inflow = inflow.saturating_add(v);
        } else {
            outflow = outflow.saturating_add(v);
        }
    }
    let net_flow = inflow - outflow;

    members.sort_by(|a, b| {
        b.portfolio_impact_pct
            .total_cmp(&a.portfolio_impact_pct)
            .then_with(|| a.delta.security_id.cmp(&b.delta.security_id))
    });

    SectorFlow {
        sector: sector.to_string(),
        inflow,
        outflow,
        net_flow,
        net_flow_pct: pct_of(net_flow, total),
        security_count: members.len(),
        top_movements: members.into_iter().take(TOP_MOVEMENTS).cloned().collect(),
    }
}
