//! Portfolio totals and per-security weights, computed for many filings at once.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::conversions::pct_of;
use crate::core::{Delta, FwError, Snapshot, SnapshotStore};
use crate::sector::normalize_security_id;

/// Total value and weights of one filing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilingWeights {
    /// Sum of equity market values, in thousands.
    pub total_value: i64,
    /// Normalized security id → weight in percent.
    pub weights: HashMap<String, f64>,
}

impl FilingWeights {
    /// Computes totals and weights from the equity rows of a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut values: HashMap<String, i64> = HashMap::new();
        let mut total: i64 = 0;
        for row in snapshot.equity_rows() {
            let id = normalize_security_id(&row.security_id);
            if id.is_empty() {
                continue;
            }
            total = total.saturating_add(row.market_value);
            let v = values.entry(id).or_default();
            *v = v.saturating_add(row.market_value);
        }
        if total == 0 {
            return Self::default();
        }
        let weights = values
            .into_iter()
            .map(|(id, v)| (id, pct_of(v, total)))
            .collect();
        Self {
            total_value: total,
            weights,
        }
    }

    /// Weight of a security in percent, if it is held and the total is non-zero.
    #[must_use]
    pub fn weight_of(&self, security_id: &str) -> Option<f64> {
        self.weights.get(security_id).copied()
    }
}

/// Where the latest portfolio total came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "filing_id", rename_all = "snake_case")]
pub enum TotalSource {
    /// The latest filing's own snapshot.
    Latest,
    /// The nearest earlier filing referenced by the deltas.
    PriorFiling(String),
    /// A direct single-filing read of the latest snapshot.
    DirectRead,
    /// Nothing usable; every impact is reported as zero.
    Unavailable,
}

/// The portfolio total used as the denominator for impacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestTotal {
    pub filing_id: Option<String>,
    pub total_value: i64,
    pub source: TotalSource,
}

/// Totals and weights for a batch of filings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioWeights {
    by_filing: HashMap<String, FilingWeights>,
}

impl PortfolioWeights {
    /// Builds weights for `filing_ids` from already loaded snapshots.
    ///
    /// Ids without a snapshot get a zero total and no weights.
    #[must_use]
    pub fn from_snapshots(filing_ids: &[String], snapshots: &HashMap<String, Snapshot>) -> Self {
        let by_filing = filing_ids
            .iter()
            .map(|id| {
                let w = snapshots
                    .get(id)
                    .map(FilingWeights::from_snapshot)
                    .unwrap_or_default();
                (id.clone(), w)
            })
            .collect();
        Self { by_filing }
    }

    /// Loads every requested filing with a single batched read.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn load(store: &dyn SnapshotStore, filing_ids: &[String]) -> Result<Self, FwError> {
        let snapshots = store.read_snapshots(filing_ids).await?;
        Ok(Self::from_snapshots(filing_ids, &snapshots))
    }

    #[must_use]
    pub fn get(&self, filing_id: &str) -> Option<&FilingWeights> {
        self.by_filing.get(filing_id)
    }

    /// Total value of a filing, zero when unknown.
    #[must_use]
    pub fn total(&self, filing_id: &str) -> i64 {
        self.by_filing.get(filing_id).map_or(0, |w| w.total_value)
    }

    /// Weight of a security in a filing.
    #[must_use]
    pub fn weight(&self, filing_id: &str, security_id: &str) -> Option<f64> {
        self.by_filing.get(filing_id)?.weight_of(security_id)
    }

    /// Resolves the total of the latest filing referenced by `deltas`.
    ///
    /// When the latest total is zero the fallback order is: the nearest earlier filing
    /// among the deltas, then a direct read of the latest snapshot, then zero. This never
    /// fails; a failing direct read is treated as "nothing usable".
    pub async fn resolve_latest_total(
        &self,
        deltas: &[Delta],
        store: &dyn SnapshotStore,
    ) -> LatestTotal {
        let Some((latest_id, latest_date)) = latest_filing(deltas) else {
            return LatestTotal {
                filing_id: None,
                total_value: 0,
                source: TotalSource::Unavailable,
            };
        };

        let total = self.total(&latest_id);
        if total != 0 {
            return LatestTotal {
                filing_id: Some(latest_id),
                total_value: total,
                source: TotalSource::Latest,
            };
        }

        if let Some((prior, t)) = self.nearest_prior_total(deltas, latest_date) {
            #[cfg(feature = "tracing")]
            tracing::debug!(latest = %latest_id, prior = %prior, "latest total is zero; using prior filing");
            return LatestTotal {
                filing_id: Some(latest_id),
                total_value: t,
                source: TotalSource::PriorFiling(prior),
            };
        }

        match store.read_snapshot(&latest_id).await {
            Ok(snap) => {
                let t = FilingWeights::from_snapshot(&snap).total_value;
                if t != 0 {
                    return LatestTotal {
                        filing_id: Some(latest_id),
                        total_value: t,
                        source: TotalSource::DirectRead,
                    };
                }
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(filing = %latest_id, error = %_e, "direct total read failed");
            }
        }

        LatestTotal {
            filing_id: Some(latest_id),
            total_value: 0,
            source: TotalSource::Unavailable,
        }
    }

    fn nearest_prior_total(&self, deltas: &[Delta], before: NaiveDate) -> Option<(String, i64)> {
        let mut candidates: Vec<(NaiveDate, &str)> = Vec::new();
        for d in deltas {
            if d.filing_date_new < before {
                candidates.push((d.filing_date_new, d.filing_id_new.as_str()));
            }
            if let (Some(id), Some(date)) = (d.filing_id_old.as_deref(), d.filing_date_old)
                && date < before
            {
                candidates.push((date, id));
            }
        }
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        candidates.dedup();
        candidates
            .into_iter()
            .map(|(_, id)| (id, self.total(id)))
            .find(|(_, t)| *t != 0)
            .map(|(id, t)| (id.to_string(), t))
    }
}

/// The newest `filing_id_new` among the deltas, ties broken by id.
fn latest_filing(deltas: &[Delta]) -> Option<(String, NaiveDate)> {
    deltas
        .iter()
        .max_by(|a, b| {
            a.filing_date_new
                .cmp(&b.filing_date_new)
                .then_with(|| b.filing_id_new.cmp(&a.filing_id_new))
        })
        .map(|d| (d.filing_id_new.clone(), d.filing_date_new))
}

/// Every filing id referenced by the deltas, old and new, without duplicates.
#[must_use]
pub fn referenced_filings(deltas: &[Delta]) -> Vec<String> {
    let mut ids: Vec<String> = deltas
        .iter()
        .flat_map(|d| std::iter::once(d.filing_id_new.clone()).chain(d.filing_id_old.clone()))
        .collect();
    ids.sort();
    ids.dedup();
    ids
}
