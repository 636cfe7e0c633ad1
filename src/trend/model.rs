use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::DeltaAction;

/// Direction of a multi-period trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Accumulating,
    Distributing,
}

/// One per-filing-pair change of a security, as seen by the trend detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendObservation {
    pub action: DeltaAction,
    pub diff_value: i64,
    /// Date of the newer filing of the pair.
    pub filing_date: NaiveDate,
}

impl TrendObservation {
    #[must_use]
    pub const fn new(action: DeltaAction, diff_value: i64, filing_date: NaiveDate) -> Self {
        Self {
            action,
            diff_value,
            filing_date,
        }
    }
}

/// The most recent unbroken streak of a security in one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub security_id: String,
    pub direction: TrendDirection,
    /// Number of same-direction deltas in the streak; always at least 2.
    pub streak_length: usize,
    /// Sum of `|diff_value|` over the streak, in thousands.
    pub total_value: i64,
    pub avg_value_per_period: f64,
    pub is_strong: bool,
    /// Newest filing date inside the streak.
    pub latest_date: NaiveDate,
    /// Oldest filing date inside the streak.
    pub earliest_date: NaiveDate,
}

/// Trends of every security of one fund.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    /// Sorted by streak length, then total value, descending.
    pub accumulating: Vec<TrendRecord>,
    /// Sorted by streak length, then total value, descending.
    pub distributing: Vec<TrendRecord>,
}

impl TrendSummary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accumulating.is_empty() && self.distributing.is_empty()
    }

    /// The trend of `security_id` in `direction`, if one qualified.
    #[must_use]
    pub fn find(&self, security_id: &str, direction: TrendDirection) -> Option<&TrendRecord> {
        let list = match direction {
            TrendDirection::Accumulating => &self.accumulating,
            TrendDirection::Distributing => &self.distributing,
        };
        list.iter().find(|t| t.security_id == security_id)
    }

    /// The trend running in the same direction as a delta of the given action.
    ///
    /// A delta that reverses a streak gets none.
    #[must_use]
    pub fn for_delta(&self, security_id: &str, action: DeltaAction) -> Option<&TrendRecord> {
        let direction = if action.is_inflow() {
            TrendDirection::Accumulating
        } else {
            TrendDirection::Distributing
        };
        self.find(security_id, direction)
    }
}
