use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/* ----- FILINGS (shared by store/, diff/, trend/) ----- */

/// Processing status of a filing as reported by the ingestion side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilingStatus {
    /// Discovered but not yet parsed.
    Pending,
    /// Holdings have been parsed; the only status eligible as a snapshot source.
    Parsed,
    /// Parsing failed upstream.
    Failed,
}

/// A single holdings report filed by a fund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    /// Store-assigned identifier.
    pub id: String,
    /// The fund that filed the report.
    pub fund_id: String,
    /// The report date; filings of one fund are totally ordered by it.
    pub filing_date: NaiveDate,
    /// Processing status.
    pub status: FilingStatus,
}

impl Filing {
    /// Whether the filing can be used as a snapshot source.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.status == FilingStatus::Parsed
    }
}

/* ----- SNAPSHOTS ----- */

/// Marker for option rows. Rows carrying one are derivatives and are excluded from analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PutCall {
    Put,
    Call,
}

/// One reported position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingRow {
    /// Ticker or issuer name, as reported.
    pub security_id: String,
    /// Number of shares; may be zero.
    pub shares: i64,
    /// Market value in thousands of reporting-currency units.
    pub market_value: i64,
    /// Present on option rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put_call: Option<PutCall>,
}

impl HoldingRow {
    /// Creates an equity row.
    pub fn new(security_id: impl Into<String>, shares: i64, market_value: i64) -> Self {
        Self {
            security_id: security_id.into(),
            shares,
            market_value,
            put_call: None,
        }
    }

    /// Whether this row is a plain equity holding (not an option).
    #[must_use]
    pub fn is_equity(&self) -> bool {
        self.put_call.is_none()
    }
}

/// The immutable set of holdings reported in one filing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub filing_id: String,
    pub rows: Vec<HoldingRow>,
}

impl Snapshot {
    pub fn new(filing_id: impl Into<String>, rows: Vec<HoldingRow>) -> Self {
        Self {
            filing_id: filing_id.into(),
            rows,
        }
    }

    /// An empty snapshot, used when no prior filing can be resolved.
    pub fn empty(filing_id: impl Into<String>) -> Self {
        Self::new(filing_id, Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over equity rows only.
    pub fn equity_rows(&self) -> impl Iterator<Item = &HoldingRow> {
        self.rows.iter().filter(|r| r.is_equity())
    }
}

/* ----- SECTOR REFERENCE ----- */

/// One entry of the sector reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRef {
    pub reference_id: String,
    pub sector: String,
}

impl SectorRef {
    pub fn new(reference_id: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            reference_id: reference_id.into(),
            sector: sector.into(),
        }
    }
}

/* ----- DELTAS ----- */

/// Classification of a per-security change between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaAction {
    New,
    Exit,
    Increase,
    Decrease,
}

impl DeltaAction {
    /// `new` and `increase` move capital into a position.
    #[must_use]
    pub const fn is_inflow(self) -> bool {
        matches!(self, DeltaAction::New | DeltaAction::Increase)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DeltaAction::New => "new",
            DeltaAction::Exit => "exit",
            DeltaAction::Increase => "increase",
            DeltaAction::Decrease => "decrease",
        }
    }
}

impl fmt::Display for DeltaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The change of one security between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub security_id: String,
    pub action: DeltaAction,
    /// `None` when the security was absent from the old snapshot.
    pub shares_old: Option<i64>,
    pub shares_new: i64,
    /// `shares_new - shares_old.unwrap_or(0)`.
    pub diff_shares: i64,
    /// New market value minus old market value.
    pub diff_value: i64,
    /// `None` whenever `shares_old` is `None` or zero; never read it as zero.
    pub diff_shares_pct: Option<f64>,
    pub filing_id_new: String,
    pub filing_id_old: Option<String>,
    pub filing_date_new: NaiveDate,
    pub filing_date_old: Option<NaiveDate>,
}

/// All deltas for one filing pair of one fund, ordered by `security_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaSet {
    pub fund_id: String,
    pub filing_id_new: String,
    pub filing_id_old: Option<String>,
    pub deltas: Vec<Delta>,
}

impl DeltaSet {
    /// An empty set, useful for hosts that want to render "no activity".
    pub fn empty(fund_id: impl Into<String>, filing_id_new: impl Into<String>) -> Self {
        Self {
            fund_id: fund_id.into(),
            filing_id_new: filing_id_new.into(),
            filing_id_old: None,
            deltas: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}
