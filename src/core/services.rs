use std::collections::HashMap;

use futures::future::BoxFuture;

use crate::core::{DeltaSet, Filing, FwError, SectorRef, Snapshot};

/// A boxed future returned by the service traits.
pub type ServiceFuture<'a, T> = BoxFuture<'a, Result<T, FwError>>;

/// Read access to parsed holdings, filings and the sector reference table.
///
/// The engine never issues one read per security: every report asks for all the
/// snapshots it needs through a single [`SnapshotStore::read_snapshots`] call and reads
/// the sector table once. Implementations should keep those two calls to a single
/// round trip each.
pub trait SnapshotStore: Send + Sync {
    /// Reads the holdings snapshot of one filing.
    ///
    /// A filing without holdings yields an empty snapshot, not an error.
    fn read_snapshot<'a>(&'a self, filing_id: &'a str) -> ServiceFuture<'a, Snapshot>;

    /// Reads several snapshots in one batched call.
    ///
    /// Ids the store does not know are simply absent from the returned map.
    fn read_snapshots<'a>(
        &'a self,
        filing_ids: &'a [String],
    ) -> ServiceFuture<'a, HashMap<String, Snapshot>>;

    /// Looks up a single filing. Unknown ids resolve to `Ok(None)`.
    fn read_filing<'a>(&'a self, filing_id: &'a str) -> ServiceFuture<'a, Option<Filing>>;

    /// Returns up to `limit` parsed filings of a fund, most recent first.
    fn read_recent_parsed_filings<'a>(
        &'a self,
        fund_id: &'a str,
        limit: usize,
    ) -> ServiceFuture<'a, Vec<Filing>>;

    /// Reads the entire sector reference table.
    fn read_sector_reference(&self) -> ServiceFuture<'_, Vec<SectorRef>>;
}

/// Write access for computed deltas.
pub trait DeltaSink: Send + Sync {
    /// Atomically replaces every delta stored for `(set.fund_id, set.filing_id_new)`.
    ///
    /// Readers must never observe a mix of the previous and the new deltas.
    fn replace_deltas<'a>(&'a self, set: &'a DeltaSet) -> ServiceFuture<'a, ()>;
}
