mod compute;

pub use compute::compute_deltas;

use chrono::NaiveDate;

use crate::core::config::MAX_TREND_LOOKBACK;
use crate::core::{DeltaSet, Filing, FwEngine, FwError, SnapshotStore};

/// How many recent filings are searched when resolving either side of the pair.
const RESOLVE_WINDOW: usize = MAX_TREND_LOOKBACK;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Latest,
    Filing(String),
    Between(NaiveDate, NaiveDate),
}

/// A builder for computing the per-security diff between two filings of one fund.
///
/// By default the fund's two most recent parsed filings are compared. The newer side can
/// be pinned with [`new_filing`](Self::new_filing) or resolved from a date range with
/// [`between`](Self::between); the older side defaults to the parsed filing immediately
/// before the newer one.
#[derive(Clone)]
pub struct DiffBuilder {
    engine: FwEngine,
    fund_id: String,
    target: Target,
    old_filing: Option<String>,
    persist: bool,
}

impl DiffBuilder {
    /// Creates a new `DiffBuilder` for a fund.
    pub fn new(engine: &FwEngine, fund_id: impl Into<String>) -> Self {
        Self {
            engine: engine.clone(),
            fund_id: fund_id.into(),
            target: Target::Latest,
            old_filing: None,
            persist: false,
        }
    }

    /// Uses a specific filing as the newer side.
    ///
    /// This will override any previously set range using `between()`.
    #[must_use]
    pub fn new_filing(mut self, filing_id: impl Into<String>) -> Self {
        self.target = Target::Filing(filing_id.into());
        self
    }

    /// Uses the most recent parsed filing dated within `[start, end]` as the newer side.
    ///
    /// This will override any previously set filing using `new_filing()`.
    #[must_use]
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.target = Target::Between(start, end);
        self
    }

    /// Uses a specific filing as the older side.
    #[must_use]
    pub fn old_filing(mut self, filing_id: impl Into<String>) -> Self {
        self.old_filing = Some(filing_id.into());
        self
    }

    /// Whether to hand the result to the engine's delta sink. (Default: `false`)
    ///
    /// Persistence is fire-and-forget: a sink failure is logged and the computed deltas
    /// are still returned.
    #[must_use]
    pub const fn persist(mut self, yes: bool) -> Self {
        self.persist = yes;
        self
    }

    /// Resolves the filing pair, reads both snapshots in one batched call and computes the diff.
    ///
    /// If the fund has no parsed filing before the newer one the diff is taken against an
    /// empty snapshot, so every security is reported as `new`.
    ///
    /// # Errors
    ///
    /// Returns an error if the newer filing cannot be resolved, a pinned filing is not a
    /// parsed filing of this fund, the newer snapshot is empty, or the store fails.
    /// Returns [`FwError::NotFound`] if the newer filing is the oldest of the recent filings
    /// searched; pin the older side with [`old_filing`](Self::old_filing) in that case.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(fund_id = %self.fund_id)))]
    pub async fn compute(self) -> Result<DeltaSet, FwError> {
        let store = self.engine.store();

        let mut recent: Option<Vec<Filing>> = None;
        let new = match &self.target {
            Target::Filing(id) => self.pinned_filing(store, id).await?,
            Target::Latest => {
                let filings = store
                    .read_recent_parsed_filings(&self.fund_id, RESOLVE_WINDOW)
                    .await?;
                let newest = filings.first().cloned().ok_or_else(|| {
                    FwError::NotFound(format!("no parsed filings for fund {}", self.fund_id))
                })?;
                recent = Some(filings);
                newest
            }
            Target::Between(start, end) => {
                if start > end {
                    return Err(FwError::InvalidDates);
                }
                let filings = store
                    .read_recent_parsed_filings(&self.fund_id, RESOLVE_WINDOW)
                    .await?;
                let newest = filings
                    .iter()
                    .find(|f| f.filing_date >= *start && f.filing_date <= *end)
                    .cloned()
                    .ok_or_else(|| {
                        FwError::NotFound(format!(
                            "no parsed filing for fund {} between {start} and {end}",
                            self.fund_id
                        ))
                    })?;
                recent = Some(filings);
                newest
            }
        };

        let old = match &self.old_filing {
            Some(id) => {
                let f = self.pinned_filing(store, id).await?;
                if f.filing_date >= new.filing_date {
                    return Err(FwError::InvalidParams(format!(
                        "old filing {id} is not older than {}",
                        new.id
                    )));
                }
                Some(f)
            }
            None => {
                let filings = match recent {
                    Some(f) => f,
                    None => {
                        store
                            .read_recent_parsed_filings(&self.fund_id, RESOLVE_WINDOW)
                            .await?
                    }
                };
                predecessor(&filings, &new)?
            }
        };

        let mut ids = vec![new.id.clone()];
        if let Some(o) = &old {
            ids.push(o.id.clone());
        }
        let mut snapshots = store.read_snapshots(&ids).await?;

        let new_snap = snapshots
            .remove(&new.id)
            .filter(|s| s.equity_rows().next().is_some())
            .ok_or_else(|| FwError::Data(format!("snapshot for filing {} is empty", new.id)))?;

        let old_snap = old.as_ref().map(|o| {
            let snap = snapshots
                .remove(&o.id)
                .unwrap_or_else(|| crate::core::Snapshot::empty(o.id.clone()));
            (snap, o.filing_date)
        });

        #[cfg(feature = "tracing")]
        if old_snap.is_none() {
            tracing::debug!(filing = %new.id, "no prior filing; diffing against an empty snapshot");
        }

        let set = compute_deltas(
            &self.fund_id,
            &new_snap,
            new.filing_date,
            old_snap.as_ref().map(|(s, d)| (s, *d)),
        )?;

        if self.persist {
            self.persist_quietly(&set).await;
        }
        Ok(set)
    }

    async fn pinned_filing(&self, store: &dyn SnapshotStore, id: &str) -> Result<Filing, FwError> {
        let f = store
            .read_filing(id)
            .await?
            .ok_or_else(|| FwError::NotFound(format!("filing {id}")))?;
        if f.fund_id != self.fund_id {
            return Err(FwError::InvalidParams(format!(
                "filing {id} belongs to fund {}, not {}",
                f.fund_id, self.fund_id
            )));
        }
        if !f.is_parsed() {
            return Err(FwError::InvalidParams(format!("filing {id} is not parsed")));
        }
        Ok(f)
    }

    async fn persist_quietly(&self, set: &DeltaSet) {
        let Some(sink) = self.engine.sink() else {
            #[cfg(feature = "tracing")]
            tracing::debug!("persist requested but no delta sink is configured");
            return;
        };
        if let Err(_e) = sink.replace_deltas(set).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(fund_id = %set.fund_id, filing = %set.filing_id_new, error = %_e, "failed to persist deltas");
        }
    }
}

/// The parsed filing right before `new`, or `None` when the fund has none.
fn predecessor(recent: &[Filing], new: &Filing) -> Result<Option<Filing>, FwError> {
    if let Some(f) = recent.iter().find(|f| f.filing_date < new.filing_date) {
        return Ok(Some(f.clone()));
    }
    if recent.len() >= RESOLVE_WINDOW {
        return Err(FwError::NotFound(format!(
            "filing before {} is outside the {RESOLVE_WINDOW} most recent filings",
            new.id
        )));
    }
    Ok(None)
}
