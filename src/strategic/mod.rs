mod api;
mod model;

pub use model::{ReportSummary, StrategicDelta, StrategicReport};

use crate::core::{DeltaSet, FwEngine, FwError};

/// A builder for the strategic analysis of one fund's delta set.
///
/// The analysis scores every delta by its share of the portfolio, merges in trend
/// membership over the fund's recent filings, and aggregates sector flows. All snapshot
/// data it needs is fetched with a single batched read, and the sector table is read once.
pub struct StrategicBuilder {
    engine: FwEngine,
    fund_id: String,
    deltas: DeltaSet,
    noise_threshold_pct: f64,
    include_low_conviction: bool,
}

impl StrategicBuilder {
    /// Creates a new `StrategicBuilder`, taking its defaults from the engine config.
    pub fn new(engine: &FwEngine, fund_id: impl Into<String>, deltas: DeltaSet) -> Self {
        let cfg = engine.config();
        Self {
            engine: engine.clone(),
            fund_id: fund_id.into(),
            deltas,
            noise_threshold_pct: cfg.noise_threshold_pct,
            include_low_conviction: cfg.include_low_conviction,
        }
    }

    /// Impact percentage below which a delta is noise. (Default: engine config, `0.5`)
    #[must_use]
    pub const fn noise_threshold(mut self, pct: f64) -> Self {
        self.noise_threshold_pct = pct;
        self
    }

    /// Whether low-conviction deltas join the merged movement list. (Default: `false`)
    #[must_use]
    pub const fn include_low_conviction(mut self, yes: bool) -> Self {
        self.include_low_conviction = yes;
        self
    }

    /// Runs the analysis.
    ///
    /// An empty delta set yields a zero-valued report without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`FwError::InvalidParams`] for a negative or non-finite noise threshold or
    /// a delta set of another fund, and propagates store failures.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(fund_id = %self.fund_id, deltas = self.deltas.len())))]
    pub async fn run(self) -> Result<StrategicReport, FwError> {
        if !self.noise_threshold_pct.is_finite() || self.noise_threshold_pct < 0.0 {
            return Err(FwError::InvalidParams(
                "noise threshold must be a non-negative number".into(),
            ));
        }
        if !self.deltas.is_empty() && self.deltas.fund_id != self.fund_id {
            return Err(FwError::InvalidParams(format!(
                "deltas belong to fund {}, not {}",
                self.deltas.fund_id, self.fund_id
            )));
        }

        let opts = api::ReportOptions::new(
            self.engine.config(),
            self.noise_threshold_pct,
            self.include_low_conviction,
        );
        api::analyze(&self.engine, &self.fund_id, &self.deltas, opts).await
    }
}
