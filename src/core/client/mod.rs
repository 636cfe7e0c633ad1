//! Public engine surface + builder.
//!
//! The engine owns no I/O of its own: every read goes through the configured
//! [`SnapshotStore`] and every write through the optional [`DeltaSink`].

use std::sync::Arc;

use crate::core::{DeltaSet, DeltaSink, EngineConfig, FwError, SnapshotStore};
use crate::diff::DiffBuilder;
use crate::strategic::StrategicBuilder;
use crate::trend::TrendSummary;

/// The entry point for computing diffs and strategic reports.
///
/// An `FwEngine` is cheap to clone; clones share the same store and sink. Reports for
/// different funds may be computed concurrently from clones of one engine.
///
/// # Example
///
/// ```no_run
/// # use fundwatch_rs::{FwEngine, MemoryStore};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let engine = FwEngine::builder()
///     .store(store.clone())
///     .sink(store)
///     .build()?;
///
/// let deltas = engine.diff("fund-1").persist(true).compute().await?;
/// let report = engine.strategic("fund-1", &deltas).run().await?;
/// println!("{} strong moves", report.summary.strong_conviction_count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FwEngine {
    store: Arc<dyn SnapshotStore>,
    sink: Option<Arc<dyn DeltaSink>>,
    config: EngineConfig,
}

impl std::fmt::Debug for FwEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FwEngine")
            .field("sink", &self.sink.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FwEngine {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> FwEngineBuilder {
        FwEngineBuilder::default()
    }

    /// The thresholds this engine was built with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    pub(crate) fn sink(&self) -> Option<&dyn DeltaSink> {
        self.sink.as_deref()
    }

    /* -------- feature entry points -------- */

    /// Starts a diff for a fund. Without further configuration the two most recent
    /// parsed filings are compared.
    #[must_use]
    pub fn diff(&self, fund_id: impl Into<String>) -> DiffBuilder {
        DiffBuilder::new(self, fund_id)
    }

    /// Starts a strategic analysis of an already computed delta set.
    #[must_use]
    pub fn strategic(&self, fund_id: impl Into<String>, deltas: &DeltaSet) -> StrategicBuilder {
        StrategicBuilder::new(self, fund_id, deltas.clone())
    }

    /// Detects accumulation and distribution trends over the fund's recent filings.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn trends(&self, fund_id: &str) -> Result<TrendSummary, FwError> {
        crate::trend::load_trends(self, fund_id).await
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct FwEngineBuilder {
    store: Option<Arc<dyn SnapshotStore>>,
    sink: Option<Arc<dyn DeltaSink>>,
    config: Option<EngineConfig>,

    noise_threshold_pct: Option<f64>,
    include_low_conviction: Option<bool>,
    trend_lookback: Option<usize>,
    max_gap_months: Option<u32>,
}

impl FwEngineBuilder {
    /// Sets the snapshot store the engine reads from. Required.
    #[must_use]
    pub fn store(mut self, store: impl SnapshotStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Sets an already shared snapshot store.
    #[must_use]
    pub fn shared_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the collaborator that persists computed deltas. Optional.
    #[must_use]
    pub fn sink(mut self, sink: impl DeltaSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Sets an already shared delta sink.
    #[must_use]
    pub fn shared_sink(mut self, sink: Arc<dyn DeltaSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replaces the whole threshold configuration.
    ///
    /// Individual setters called on the builder take precedence over this.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Default noise threshold, in percent of portfolio value. (Default: `0.5`)
    #[must_use]
    pub const fn noise_threshold(mut self, pct: f64) -> Self {
        self.noise_threshold_pct = Some(pct);
        self
    }

    /// Default for including low-conviction deltas in the merged list. (Default: `false`)
    #[must_use]
    pub const fn include_low_conviction(mut self, yes: bool) -> Self {
        self.include_low_conviction = Some(yes);
        self
    }

    /// Number of recent filings scanned for trends, clamped to 8. (Default: `8`)
    #[must_use]
    pub const fn trend_lookback(mut self, filings: usize) -> Self {
        self.trend_lookback = Some(filings);
        self
    }

    /// Largest tolerated gap between streak members, in months. (Default: `5`)
    #[must_use]
    pub const fn max_gap_months(mut self, months: u32) -> Self {
        self.max_gap_months = Some(months);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns [`FwError::InvalidParams`] if no store was configured or a threshold is invalid.
    pub fn build(self) -> Result<FwEngine, FwError> {
        let store = self
            .store
            .ok_or_else(|| FwError::InvalidParams("a snapshot store is required".into()))?;

        let mut config = self.config.unwrap_or_default();
        if let Some(v) = self.noise_threshold_pct {
            config.noise_threshold_pct = v;
        }
        if let Some(v) = self.include_low_conviction {
            config.include_low_conviction = v;
        }
        if let Some(v) = self.trend_lookback {
            config.trend_lookback = v;
        }
        if let Some(v) = self.max_gap_months {
            config.max_gap_months = v;
        }
        config.validate()?;

        Ok(FwEngine {
            store,
            sink: self.sink,
            config,
        })
    }
}
