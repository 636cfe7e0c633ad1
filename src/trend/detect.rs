use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};

use crate::core::DeltaAction;
use crate::core::conversions::average;

use super::model::{TrendDirection, TrendObservation, TrendRecord, TrendSummary};

/// Parameters of the streak scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendParams {
    /// Largest tolerated gap between consecutive streak members, in months.
    pub max_gap_months: u32,
    /// Length from which a streak is strong.
    pub strong_streak: usize,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            max_gap_months: 5,
            strong_streak: 3,
        }
    }
}

/// Shortest streak that is reported.
pub const MIN_STREAK: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sense {
    Same,
    Opposite,
    Neutral,
}

fn accumulates(o: &TrendObservation) -> bool {
    matches!(o.action, DeltaAction::New | DeltaAction::Increase) && o.diff_value > 0
}

fn distributes(o: &TrendObservation) -> bool {
    o.action == DeltaAction::Exit || (o.action == DeltaAction::Decrease && o.diff_value < 0)
}

fn sense(o: &TrendObservation, direction: TrendDirection) -> Sense {
    let (same, opposite) = match direction {
        TrendDirection::Accumulating => (accumulates(o), distributes(o)),
        TrendDirection::Distributing => (distributes(o), accumulates(o)),
    };
    if same {
        Sense::Same
    } else if opposite {
        Sense::Opposite
    } else {
        Sense::Neutral
    }
}

/// Whether `older` lies more than `months` before `newer`.
fn gap_exceeded(newer: NaiveDate, older: NaiveDate, months: u32) -> bool {
    newer
        .checked_sub_months(Months::new(months))
        .is_none_or(|limit| older < limit)
}

/// Scans one security's observations for its most recent streak in `direction`.
///
/// Observations are walked newest first. Before the streak starts, opposite and
/// neutral observations are skipped. Once it has started, an opposite observation or a
/// gap larger than `max_gap_months` ends it; a neutral observation neither extends nor
/// ends it but moves the reference date for the next gap check.
///
/// Returns `None` unless the streak reaches [`MIN_STREAK`].
#[must_use]
pub fn detect_streak(
    security_id: &str,
    observations: &[TrendObservation],
    direction: TrendDirection,
    params: TrendParams,
) -> Option<TrendRecord> {
    let mut ordered: Vec<&TrendObservation> = observations.iter().collect();
    ordered.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));

    let mut streak = 0usize;
    let mut total: i64 = 0;
    let mut last_seen: Option<NaiveDate> = None;
    let mut latest: Option<NaiveDate> = None;
    let mut earliest: Option<NaiveDate> = None;

    for o in ordered {
        match sense(o, direction) {
            Sense::Same => {
                if let Some(last) = last_seen
                    && gap_exceeded(last, o.filing_date, params.max_gap_months)
                {
                    break;
                }
                streak += 1;
                total = total.saturating_add(o.diff_value.saturating_abs());
                last_seen = Some(o.filing_date);
                latest.get_or_insert(o.filing_date);
                earliest = Some(o.filing_date);
            }
            Sense::Opposite => {
                if streak > 0 {
                    break;
                }
            }
            Sense::Neutral => {
                if streak > 0 {
                    last_seen = Some(o.filing_date);
                }
            }
        }
    }

    if streak < MIN_STREAK {
        return None;
    }
    Some(TrendRecord {
        security_id: security_id.to_string(),
        direction,
        streak_length: streak,
        total_value: total,
        avg_value_per_period: average(total, streak),
        is_strong: streak >= params.strong_streak,
        latest_date: latest?,
        earliest_date: earliest?,
    })
}

/// Runs the streak scan for every security, independently in both directions.
#[must_use]
pub fn detect_trends(
    history: &BTreeMap<String, Vec<TrendObservation>>,
    params: TrendParams,
) -> TrendSummary {
    let mut summary = TrendSummary::default();
    for (id, obs) in history {
        if let Some(t) = detect_streak(id, obs, TrendDirection::Accumulating, params) {
            summary.accumulating.push(t);
        }
        if let Some(t) = detect_streak(id, obs, TrendDirection::Distributing, params) {
            summary.distributing.push(t);
        }
    }
    let by_strength = |a: &TrendRecord, b: &TrendRecord| {
        b.streak_length
            .cmp(&a.streak_length)
            .then_with(|| b.total_value.cmp(&a.total_value))
            .then_with(|| a.security_id.cmp(&b.security_id))
    };
    summary.accumulating.sort_by(by_strength);
    summary.distributing.sort_by(by_strength);
    summary
}
