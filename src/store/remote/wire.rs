use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{Delta, DeltaSet, Filing, FilingStatus, FwError, HoldingRow, PutCall, SectorRef, Snapshot};

#[derive(Deserialize)]
pub(crate) struct SnapshotsEnvelope {
    #[serde(default)]
    pub(crate) snapshots: Vec<SnapshotNode>,
}

#[derive(Deserialize)]
pub(crate) struct SnapshotNode {
    pub(crate) filing_id: Option<String>,
    #[serde(default)]
    pub(crate) holdings: Vec<HoldingNode>,
}

#[derive(Deserialize)]
pub(crate) struct HoldingNode {
    pub(crate) security: Option<String>,
    pub(crate) shares: Option<i64>,
    /// Thousands of reporting-currency units.
    pub(crate) value: Option<i64>,
    #[serde(rename = "putCall")]
    pub(crate) put_call: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct FilingsEnvelope {
    #[serde(default)]
    pub(crate) filings: Vec<FilingNode>,
}

#[derive(Deserialize)]
pub(crate) struct FilingNode {
    pub(crate) id: Option<String>,
    pub(crate) fund_id: Option<String>,
    pub(crate) filing_date: Option<String>,
    pub(crate) status: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct SectorsEnvelope {
    #[serde(default)]
    pub(crate) sectors: Vec<SectorNode>,
}

#[derive(Deserialize)]
pub(crate) struct SectorNode {
    pub(crate) reference_id: Option<String>,
    pub(crate) sector: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct DeltasPayload<'a> {
    pub(crate) fund_id: &'a str,
    pub(crate) filing_id_new: &'a str,
    pub(crate) filing_id_old: Option<&'a str>,
    pub(crate) deltas: &'a [Delta],
}

impl<'a> From<&'a DeltaSet> for DeltasPayload<'a> {
    fn from(set: &'a DeltaSet) -> Self {
        Self {
            fund_id: &set.fund_id,
            filing_id_new: &set.filing_id_new,
            filing_id_old: set.filing_id_old.as_deref(),
            deltas: &set.deltas,
        }
    }
}

/* ---------------- wire → model ---------------- */

impl SnapshotNode {
    pub(crate) fn into_snapshot(self) -> Result<Snapshot, FwError> {
        let filing_id = self
            .filing_id
            .ok_or_else(|| FwError::Data("snapshot without filing_id".into()))?;
        let rows = self
            .holdings
            .into_iter()
            .map(|h| h.into_row(&filing_id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Snapshot { filing_id, rows })
    }
}

impl HoldingNode {
    fn into_row(self, filing_id: &str) -> Result<HoldingRow, FwError> {
        let security_id = self
            .security
            .ok_or_else(|| FwError::Data(format!("holding without security in {filing_id}")))?;
        let put_call = match self.put_call.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("") => None,
            Some("put") => Some(PutCall::Put),
            Some("call") => Some(PutCall::Call),
            Some(other) => {
                return Err(FwError::Data(format!(
                    "unknown putCall {other:?} for {security_id} in {filing_id}"
                )));
            }
        };
        Ok(HoldingRow {
            shares: self.shares.unwrap_or(0),
            market_value: self.value.unwrap_or(0),
            security_id,
            put_call,
        })
    }
}

fn parse_status(s: &str) -> Result<FilingStatus, FwError> {
    match s.to_ascii_uppercase().as_str() {
        "PARSED" => Ok(FilingStatus::Parsed),
        "PENDING" => Ok(FilingStatus::Pending),
        "FAILED" => Ok(FilingStatus::Failed),
        other => Err(FwError::Data(format!("unknown filing status {other:?}"))),
    }
}

impl FilingNode {
    pub(crate) fn into_filing(self) -> Result<Filing, FwError> {
        let id = self
            .id
            .ok_or_else(|| FwError::Data("filing without id".into()))?;
        let fund_id = self
            .fund_id
            .ok_or_else(|| FwError::Data(format!("filing {id} without fund_id")))?;
        let raw_date = self
            .filing_date
            .ok_or_else(|| FwError::Data(format!("filing {id} without filing_date")))?;
        let filing_date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
            .map_err(|e| FwError::Data(format!("filing {id} has bad date {raw_date:?}: {e}")))?;
        let status = parse_status(self.status.as_deref().unwrap_or("PARSED"))?;
        Ok(Filing {
            id,
            fund_id,
            filing_date,
            status,
        })
    }
}

impl SectorNode {
    /// Entries missing either field are dropped rather than failing the whole table.
    pub(crate) fn into_ref(self) -> Option<SectorRef> {
        Some(SectorRef {
            reference_id: self.reference_id?,
            sector: self.sector?,
        })
    }
}
