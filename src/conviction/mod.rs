//! Conviction scoring of deltas by portfolio significance.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::{DeltaAction, EngineConfig};
use crate::strategic::StrategicDelta;

/// Coarse significance bucket of a delta. Ordered from least to most significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvictionLevel {
    Noise,
    Low,
    Medium,
    High,
}

/// Impact thresholds, in percent of portfolio value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvictionThresholds {
    pub high_pct: f64,
    pub medium_pct: f64,
    /// Below this a delta is noise.
    pub noise_pct: f64,
    /// A new position at or above this is high conviction.
    pub new_position_high_pct: f64,
    /// Streak length that forces high conviction.
    pub strong_streak: usize,
}

impl Default for ConvictionThresholds {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for ConvictionThresholds {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            high_pct: 5.0,
            medium_pct: 1.0,
            noise_pct: cfg.noise_threshold_pct,
            new_position_high_pct: cfg.new_position_high_pct,
            strong_streak: cfg.strong_streak,
        }
    }
}

/// Classifies a delta by its action and portfolio impact alone.
#[must_use]
pub fn classify(action: DeltaAction, impact_pct: f64, t: &ConvictionThresholds) -> ConvictionLevel {
    if action == DeltaAction::Exit {
        return ConvictionLevel::High;
    }
    if action == DeltaAction::New && impact_pct >= t.new_position_high_pct {
        return ConvictionLevel::High;
    }
    if impact_pct >= t.high_pct {
        ConvictionLevel::High
    } else if impact_pct >= t.medium_pct {
        ConvictionLevel::Medium
    } else if impact_pct >= t.noise_pct {
        ConvictionLevel::Low
    } else {
        ConvictionLevel::Noise
    }
}

/// Raises a level according to trend membership. Never lowers it.
///
/// A streak of `strong_streak` or more forces `High`; any shorter qualifying streak
/// lifts the level to at least `Medium`.
#[must_use]
pub fn apply_trend(
    level: ConvictionLevel,
    streak: Option<usize>,
    t: &ConvictionThresholds,
) -> ConvictionLevel {
    match streak {
        Some(n) if n >= t.strong_streak => ConvictionLevel::High,
        Some(n) if n >= crate::trend::MIN_STREAK => level.max(ConvictionLevel::Medium),
        _ => level,
    }
}

/// Non-noise deltas split by conviction, each list by impact descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvictionBuckets {
    pub strong: Vec<StrategicDelta>,
    pub medium: Vec<StrategicDelta>,
    pub low: Vec<StrategicDelta>,
    pub noise_filtered_out: usize,
}

impl ConvictionBuckets {
    /// Places every delta into exactly one bucket, or counts it as noise.
    #[must_use]
    pub fn partition<I>(deltas: I) -> Self
    where
        I: IntoIterator<Item = StrategicDelta>,
    {
        let mut b = Self::default();
        for d in deltas {
            match d.conviction_level {
                ConvictionLevel::High => b.strong.push(d),
                ConvictionLevel::Medium => b.medium.push(d),
                ConvictionLevel::Low => b.low.push(d),
                ConvictionLevel::Noise => b.noise_filtered_out += 1,
            }
        }
        b.strong.sort_by(by_impact_desc);
        b.medium.sort_by(by_impact_desc);
        b.low.sort_by(by_impact_desc);
        b
    }

    /// Strong and medium (and optionally low) deltas in presentation order.
    ///
    /// Deltas in a strong streak come first with longer streaks ahead, then deltas in any
    /// qualifying streak, then the rest by impact descending.
    #[must_use]
    pub fn merged(&self, include_low: bool, strong_streak: usize) -> Vec<StrategicDelta> {
        let low: &[StrategicDelta] = if include_low { &self.low } else { &[] };
        let mut all: Vec<StrategicDelta> = self
            .strong
            .iter()
            .chain(&self.medium)
            .chain(low)
            .cloned()
            .collect();
        all.sort_by(|a, b| movement_order(a, b, strong_streak));
        all
    }
}

fn streak_tier(d: &StrategicDelta, strong_streak: usize) -> u8 {
    match d.trend_streak_length {
        Some(n) if n >= strong_streak => 0,
        Some(n) if n >= crate::trend::MIN_STREAK => 1,
        _ => 2,
    }
}

fn by_impact_desc(a: &StrategicDelta, b: &StrategicDelta) -> Ordering {
    b.portfolio_impact_pct
        .total_cmp(&a.portfolio_impact_pct)
        .then_with(|| a.delta.security_id.cmp(&b.delta.security_id))
}

fn movement_order(a: &StrategicDelta, b: &StrategicDelta, strong_streak: usize) -> Ordering {
    streak_tier(a, strong_streak)
        .cmp(&streak_tier(b, strong_streak))
        .then_with(|| {
            b.trend_streak_length
                .unwrap_or(0)
                .cmp(&a.trend_streak_length.unwrap_or(0))
        })
        .then_with(|| by_impact_desc(a, b))
}
