use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;

use crate::core::{
    DeltaSet, DeltaSink, Filing, FwError, SectorRef, ServiceFuture, Snapshot, SnapshotStore,
};

/// Counts of store calls, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadCounts {
    pub snapshot: usize,
    pub snapshots_batched: usize,
    pub filing: usize,
    pub recent_filings: usize,
    pub sector_reference: usize,
}

#[derive(Debug, Default)]
struct Counters {
    snapshot: AtomicUsize,
    snapshots_batched: AtomicUsize,
    filing: AtomicUsize,
    recent_filings: AtomicUsize,
    sector_reference: AtomicUsize,
}

#[derive(Debug, Default)]
struct Data {
    filings: HashMap<String, Filing>,
    snapshots: HashMap<String, Snapshot>,
    sectors: Vec<SectorRef>,
    deltas: HashMap<(String, String), DeltaSet>,
    read_failure: Option<String>,
    write_failure: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    data: RwLock<Data>,
    counters: Counters,
}

/// An in-process store implementing both [`SnapshotStore`] and [`DeltaSink`].
///
/// Clones share the same data. Delta replacement happens under one write lock, so a
/// reader sees either the previous or the new delta set of a filing pair, never a mix.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a filing together with its holdings.
    pub async fn put_filing(&self, filing: Filing, snapshot: Snapshot) {
        let mut data = self.inner.data.write().await;
        let snapshot = Snapshot {
            filing_id: filing.id.clone(),
            ..snapshot
        };
        data.snapshots.insert(filing.id.clone(), snapshot);
        data.filings.insert(filing.id.clone(), filing);
    }

    /// Adds or replaces a filing without holdings.
    pub async fn put_filing_only(&self, filing: Filing) {
        let mut data = self.inner.data.write().await;
        data.filings.insert(filing.id.clone(), filing);
    }

    /// Replaces the sector reference table.
    pub async fn set_sector_reference(&self, table: Vec<SectorRef>) {
        self.inner.data.write().await.sectors = table;
    }

    /// The deltas currently stored for a filing pair.
    pub async fn deltas(&self, fund_id: &str, filing_id_new: &str) -> Option<DeltaSet> {
        self.inner
            .data
            .read()
            .await
            .deltas
            .get(&(fund_id.to_string(), filing_id_new.to_string()))
            .cloned()
    }

    /// Makes every subsequent read fail with [`FwError::Store`]; `None` restores reads.
    pub async fn fail_reads(&self, message: Option<&str>) {
        self.inner.data.write().await.read_failure = message.map(str::to_string);
    }

    /// Makes every subsequent delta write fail with [`FwError::Store`]; `None` restores writes.
    pub async fn fail_writes(&self, message: Option<&str>) {
        self.inner.data.write().await.write_failure = message.map(str::to_string);
    }

    /// Number of calls served so far.
    #[must_use]
    pub fn read_counts(&self) -> ReadCounts {
        let c = &self.inner.counters;
        ReadCounts {
            snapshot: c.snapshot.load(Ordering::Relaxed),
            snapshots_batched: c.snapshots_batched.load(Ordering::Relaxed),
            filing: c.filing.load(Ordering::Relaxed),
            recent_filings: c.recent_filings.load(Ordering::Relaxed),
            sector_reference: c.sector_reference.load(Ordering::Relaxed),
        }
    }

    /// Resets all read counters.
    pub fn reset_read_counts(&self) {
        let c = &self.inner.counters;
        for n in [
            &c.snapshot,
            &c.snapshots_batched,
            &c.filing,
            &c.recent_filings,
            &c.sector_reference,
        ] {
            n.store(0, Ordering::Relaxed);
        }
    }
}

fn check(failure: Option<&String>) -> Result<(), FwError> {
    match failure {
        Some(msg) => Err(FwError::Store(msg.clone())),
        None => Ok(()),
    }
}

impl SnapshotStore for MemoryStore {
    fn read_snapshot<'a>(&'a self, filing_id: &'a str) -> ServiceFuture<'a, Snapshot> {
        Box::pin(async move {
            self.inner.counters.snapshot.fetch_add(1, Ordering::Relaxed);
            let data = self.inner.data.read().await;
            check(data.read_failure.as_ref())?;
            Ok(data
                .snapshots
                .get(filing_id)
                .cloned()
                .unwrap_or_else(|| Snapshot::empty(filing_id)))
        })
    }

    fn read_snapshots<'a>(
        &'a self,
        filing_ids: &'a [String],
    ) -> ServiceFuture<'a, HashMap<String, Snapshot>> {
        Box::pin(async move {
            self.inner
                .counters
                .snapshots_batched
                .fetch_add(1, Ordering::Relaxed);
            let data = self.inner.data.read().await;
            check(data.read_failure.as_ref())?;
            Ok(filing_ids
                .iter()
                .filter_map(|id| data.snapshots.get(id).map(|s| (id.clone(), s.clone())))
                .collect())
        })
    }

    fn read_filing<'a>(&'a self, filing_id: &'a str) -> ServiceFuture<'a, Option<Filing>> {
        Box::pin(async move {
            self.inner.counters.filing.fetch_add(1, Ordering::Relaxed);
            let data = self.inner.data.read().await;
            check(data.read_failure.as_ref())?;
            Ok(data.filings.get(filing_id).cloned())
        })
    }

    fn read_recent_parsed_filings<'a>(
        &'a self,
        fund_id: &'a str,
        limit: usize,
    ) -> ServiceFuture<'a, Vec<Filing>> {
        Box::pin(async move {
            self.inner
                .counters
                .recent_filings
                .fetch_add(1, Ordering::Relaxed);
            let data = self.inner.data.read().await;
            check(data.read_failure.as_ref())?;
            let mut filings: Vec<Filing> = data
                .filings
                .values()
                .filter(|f| f.fund_id == fund_id && f.is_parsed())
                .cloned()
                .collect();
            filings.sort_by(|a, b| b.filing_date.cmp(&a.filing_date).then_with(|| a.id.cmp(&b.id)));
            filings.truncate(limit);
            Ok(filings)
        })
    }

    fn read_sector_reference(&self) -> ServiceFuture<'_, Vec<SectorRef>> {
        Box::pin(async move {
            self.inner
                .counters
                .sector_reference
                .fetch_add(1, Ordering::Relaxed);
            let data = self.inner.data.read().await;
            check(data.read_failure.as_ref())?;
            Ok(data.sectors.clone())
        })
    }
}

impl DeltaSink for MemoryStore {
    fn replace_deltas<'a>(&'a self, set: &'a DeltaSet) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            let mut data = self.inner.data.write().await;
            check(data.write_failure.as_ref())?;
            data.deltas
                .insert((set.fund_id.clone(), set.filing_id_new.clone()), set.clone());
            Ok(())
        })
    }
}
