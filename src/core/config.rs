//! Engine thresholds.

use serde::{Deserialize, Serialize};

use crate::core::FwError;

/// The most filings the trend detector ever looks back over.
pub const MAX_TREND_LOOKBACK: usize = 8;

/// Tunable thresholds used by the engine.
///
/// Every field has a default, so a host document only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deltas whose portfolio impact is below this percentage are noise.
    pub noise_threshold_pct: f64,
    /// Whether low-conviction deltas join the merged "all movements" list.
    pub include_low_conviction: bool,
    /// How many recent parsed filings feed trend detection (at most 8).
    pub trend_lookback: usize,
    /// Largest gap between two streak members, in months, before the streak breaks.
    pub max_gap_months: u32,
    /// `|net_flow_pct|` at or above which a named sector signals rotation.
    pub rotation_threshold_pct: f64,
    /// A new position at or above this impact is high conviction.
    pub new_position_high_pct: f64,
    /// Streak length that forces high conviction.
    pub strong_streak: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            noise_threshold_pct: 0.5,
            include_low_conviction: false,
            trend_lookback: MAX_TREND_LOOKBACK,
            max_gap_months: 5,
            rotation_threshold_pct: 20.0,
            new_position_high_pct: 3.0,
            strong_streak: 3,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration document, filling unspecified fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or a threshold is out of range.
    pub fn from_json_str(s: &str) -> Result<Self, FwError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks that every threshold is usable.
    ///
    /// # Errors
    ///
    /// Returns [`FwError::InvalidParams`] naming the first offending field.
    pub fn validate(&self) -> Result<(), FwError> {
        if !self.noise_threshold_pct.is_finite() || self.noise_threshold_pct < 0.0 {
            return Err(FwError::InvalidParams(
                "noise_threshold_pct must be a non-negative number".into(),
            ));
        }
        if !self.rotation_threshold_pct.is_finite() || self.rotation_threshold_pct < 0.0 {
            return Err(FwError::InvalidParams(
                "rotation_threshold_pct must be a non-negative number".into(),
            ));
        }
        if !self.new_position_high_pct.is_finite() || self.new_position_high_pct < 0.0 {
            return Err(FwError::InvalidParams(
                "new_position_high_pct must be a non-negative number".into(),
            ));
        }
        if self.trend_lookback < 2 {
            return Err(FwError::InvalidParams(
                "trend_lookback must cover at least two filings".into(),
            ));
        }
        if self.max_gap_months == 0 {
            return Err(FwError::InvalidParams("max_gap_months must be positive".into()));
        }
        if self.strong_streak < 2 {
            return Err(FwError::InvalidParams("strong_streak must be at least 2".into()));
        }
        Ok(())
    }

    /// `trend_lookback` clamped to the supported maximum.
    #[must_use]
    pub fn effective_lookback(&self) -> usize {
        self.trend_lookback.min(MAX_TREND_LOOKBACK)
    }
}
