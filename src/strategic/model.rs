use serde::{Deserialize, Serialize};

use crate::conviction::ConvictionLevel;
use crate::core::{Delta, DeltaAction};
use crate::flows::SectorFlows;
use crate::trend::{TrendDirection, TrendSummary};
use crate::weights::TotalSource;

/// A delta enriched with portfolio significance, sector and trend membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicDelta {
    #[serde(flatten)]
    pub delta: Delta,
    /// `|diff_value|` in percent of the latest portfolio total; zero for a zero total.
    pub portfolio_impact_pct: f64,
    pub portfolio_weight_old: Option<f64>,
    pub portfolio_weight_new: Option<f64>,
    /// Level from impact alone, before any trend override.
    pub impact_conviction: ConvictionLevel,
    /// Effective level after the trend override.
    pub conviction_level: ConvictionLevel,
    pub sector: Option<String>,
    pub trend_streak_length: Option<usize>,
    pub trend_direction: Option<TrendDirection>,
}

impl StrategicDelta {
    #[must_use]
    pub fn security_id(&self) -> &str {
        &self.delta.security_id
    }

    #[must_use]
    pub const fn action(&self) -> DeltaAction {
        self.delta.action
    }

    /// A decrease that keeps part of the position.
    #[must_use]
    pub fn is_trim(&self) -> bool {
        self.delta.action == DeltaAction::Decrease
    }
}

/// Headline counters of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Portfolio total used as the impact denominator, in thousands.
    pub latest_portfolio_value: i64,
    /// Σ|diff_value| over every delta, noise included.
    pub gross_activity_value: i64,
    /// Σ|diff_value| over `new` and `increase` deltas.
    pub net_inflow: i64,
    /// Σ|diff_value| over `exit` and `decrease` deltas.
    pub net_outflow: i64,
    pub strong_conviction_count: usize,
    pub exit_count: usize,
    pub new_position_count: usize,
    pub sector_rotation_detected: bool,
    /// Where `latest_portfolio_value` came from.
    pub total_source: Option<TotalSource>,
}

/// The strategic analysis of one filing pair of one fund.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategicReport {
    pub fund_id: String,
    pub filing_id_new: Option<String>,
    pub filing_id_old: Option<String>,
    pub summary: ReportSummary,
    pub strong: Vec<StrategicDelta>,
    pub medium: Vec<StrategicDelta>,
    pub low: Vec<StrategicDelta>,
    pub noise_filtered_out: usize,
    pub sector_flows: SectorFlows,
    /// Full liquidations, by impact descending.
    pub exits: Vec<StrategicDelta>,
    /// Partial reductions, by impact descending.
    pub trims: Vec<StrategicDelta>,
    /// Positions opened in the newer filing, by impact descending.
    pub new_positions: Vec<StrategicDelta>,
    /// Strong + medium (+ low when requested) in presentation order.
    pub all_movements: Vec<StrategicDelta>,
    pub trends: TrendSummary,
}

impl StrategicReport {
    /// A zero-valued report for a fund without activity.
    pub fn empty(fund_id: impl Into<String>) -> Self {
        Self {
            fund_id: fund_id.into(),
            ..Self::default()
        }
    }

    /// Whether the report carries no movement at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strong.is_empty()
            && self.medium.is_empty()
            && self.low.is_empty()
            && self.noise_filtered_out == 0
    }
}
