//! fundwatch-rs: portfolio diff and strategic trend engine for institutional holdings filings.
//!
//! Given time-ordered holdings snapshots of a fund, the engine
//! - computes a per-security delta between two filings ([`diff`]),
//! - scores each delta by its share of the portfolio ([`conviction`], [`weights`]),
//! - finds multi-period accumulation and distribution streaks ([`trend`]),
//! - and aggregates the deltas into sector-level capital flows ([`flows`]).
//!
//! All reads go through a [`SnapshotStore`]; computed deltas can be handed to a
//! [`DeltaSink`]. The [`store`] module ships in-memory, cached and HTTP adapters.

pub mod conviction;
pub mod core;
pub mod diff;
pub mod flows;
pub mod sector;
pub mod store;
pub mod strategic;
pub mod trend;
pub mod weights;

pub use conviction::{ConvictionBuckets, ConvictionLevel, ConvictionThresholds};
pub use crate::core::{
    Delta, DeltaAction, DeltaSet, DeltaSink, EngineConfig, Filing, FilingStatus, FwEngine,
    FwEngineBuilder, FwError, HoldingRow, PutCall, SectorRef, Snapshot, SnapshotStore,
};
pub use diff::DiffBuilder;
pub use flows::{SectorFlow, SectorFlows};
pub use store::{CacheMode, CachedStore, MemoryStore, RemoteStore, RetryConfig};
pub use strategic::{ReportSummary, StrategicBuilder, StrategicDelta, StrategicReport};
pub use trend::{TrendDirection, TrendRecord, TrendSummary};
