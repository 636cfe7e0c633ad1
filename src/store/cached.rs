use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::core::{
    DeltaSet, DeltaSink, Filing, SectorRef, ServiceFuture, Snapshot, SnapshotStore,
};

/// Defines the behavior of the in-memory cache for reads through a [`CachedStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present; otherwise, read from the inner
    /// store and write the result to the cache. (Default)
    Use,
    /// Always read from the inner store, bypassing any cached entry, and write the new result to the cache.
    Refresh,
    /// Always read from the inner store and do not read from or write to the cache.
    Bypass,
}

#[derive(Debug, Clone)]
enum Cached {
    Snapshot(Snapshot),
    Filing(Option<Filing>),
    Filings(Vec<Filing>),
    Sectors(Vec<SectorRef>),
}

#[derive(Debug)]
struct CacheEntry {
    value: Cached,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheStore {
    map: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

fn snapshot_key(filing_id: &str) -> String {
    format!("snapshot:{filing_id}")
}

fn filing_key(filing_id: &str) -> String {
    format!("filing:{filing_id}")
}

fn filings_key(fund_id: &str, limit: usize) -> String {
    format!("filings:{fund_id}:{limit}")
}

const SECTORS_KEY: &str = "sectors";

/// A TTL cache in front of another [`SnapshotStore`].
///
/// Keys are `snapshot:{filing_id}`, `filing:{filing_id}`, `filings:{fund_id}:{limit}` and
/// `sectors`. A batched snapshot read serves hits from the cache and fetches all misses
/// with one batched call to the inner store. Writes through [`DeltaSink`] are passed on
/// untouched; deltas are never cached.
#[derive(Debug, Clone)]
pub struct CachedStore<S> {
    inner: S,
    cache: Arc<CacheStore>,
    mode: CacheMode,
}

impl<S> CachedStore<S> {
    /// Wraps `inner`, keeping entries for `ttl`.
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(CacheStore {
                map: RwLock::new(HashMap::new()),
                default_ttl: ttl,
            }),
            mode: CacheMode::Use,
        }
    }

    /// Sets the cache mode for reads through this handle. Clones share the cache.
    #[must_use]
    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }

    /// The wrapped store.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops every cached entry.
    pub async fn clear(&self) {
        self.cache.map.write().await.clear();
    }

    /// Drops the cached entries of one filing.
    pub async fn invalidate_filing(&self, filing_id: &str) {
        let mut map = self.cache.map.write().await;
        map.remove(&snapshot_key(filing_id));
        map.remove(&filing_key(filing_id));
    }

    async fn get(&self, key: &str) -> Option<Cached> {
        if self.mode != CacheMode::Use {
            return None;
        }
        let guard = self.cache.map.read().await;
        if let Some(entry) = guard.get(key)
            && Instant::now() <= entry.expires_at
        {
            return Some(entry.value.clone());
        }
        None
    }

    /// Number of entries held, expired ones not yet evicted included.
    pub async fn entry_count(&self) -> usize {
        self.cache.map.read().await.len()
    }

    async fn put(&self, key: String, value: Cached) {
        self.put_many(vec![(key, value)]).await;
    }

    /// Inserts entries under one write lock, evicting everything that has expired.
    async fn put_many(&self, entries: Vec<(String, Cached)>) {
        if self.mode == CacheMode::Bypass || entries.is_empty() {
            return;
        }
        let now = Instant::now();
        let expires_at = now + self.cache.default_ttl;
        let mut guard = self.cache.map.write().await;
        guard.retain(|_, e| now <= e.expires_at);
        for (key, value) in entries {
            guard.insert(key, CacheEntry { value, expires_at });
        }
    }
}

impl<S: SnapshotStore> SnapshotStore for CachedStore<S> {
    fn read_snapshot<'a>(&'a self, filing_id: &'a str) -> ServiceFuture<'a, Snapshot> {
        Box::pin(async move {
            let key = snapshot_key(filing_id);
            if let Some(Cached::Snapshot(s)) = self.get(&key).await {
                return Ok(s);
            }
            let snap = self.inner.read_snapshot(filing_id).await?;
            self.put(key, Cached::Snapshot(snap.clone())).await;
            Ok(snap)
        })
    }

    fn read_snapshots<'a>(
        &'a self,
        filing_ids: &'a [String],
    ) -> ServiceFuture<'a, HashMap<String, Snapshot>> {
        Box::pin(async move {
            let mut out = HashMap::with_capacity(filing_ids.len());
            let mut misses: Vec<String> = Vec::new();
            for id in filing_ids {
                match self.get(&snapshot_key(id)).await {
                    Some(Cached::Snapshot(s)) => {
                        out.insert(id.clone(), s);
                    }
                    _ => misses.push(id.clone()),
                }
            }
            if !misses.is_empty() {
                let fetched = self.inner.read_snapshots(&misses).await?;
                let mut entries = Vec::with_capacity(fetched.len());
                for (id, snap) in fetched {
                    entries.push((snapshot_key(&id), Cached::Snapshot(snap.clone())));
                    out.insert(id, snap);
                }
                self.put_many(entries).await;
            }
            Ok(out)
        })
    }

    fn read_filing<'a>(&'a self, filing_id: &'a str) -> ServiceFuture<'a, Option<Filing>> {
        Box::pin(async move {
            let key = filing_key(filing_id);
            if let Some(Cached::Filing(f)) = self.get(&key).await {
                return Ok(f);
            }
            let f = self.inner.read_filing(filing_id).await?;
            self.put(key, Cached::Filing(f.clone())).await;
            Ok(f)
        })
    }

    fn read_recent_parsed_filings<'a>(
        &'a self,
        fund_id: &'a str,
        limit: usize,
    ) -> ServiceFuture<'a, Vec<Filing>> {
        Box::pin(async move {
            let key = filings_key(fund_id, limit);
            if let Some(Cached::Filings(f)) = self.get(&key).await {
                return Ok(f);
            }
            let f = self.inner.read_recent_parsed_filings(fund_id, limit).await?;
            self.put(key, Cached::Filings(f.clone())).await;
            Ok(f)
        })
    }

    fn read_sector_reference(&self) -> ServiceFuture<'_, Vec<SectorRef>> {
        Box::pin(async move {
            if let Some(Cached::Sectors(t)) = self.get(SECTORS_KEY).await {
                return Ok(t);
            }
            let t = self.inner.read_sector_reference().await?;
            self.put(SECTORS_KEY.to_string(), Cached::Sectors(t.clone()))
                .await;
            Ok(t)
        })
    }
}

impl<S: DeltaSink> DeltaSink for CachedStore<S> {
    fn replace_deltas<'a>(&'a self, set: &'a DeltaSet) -> ServiceFuture<'a, ()> {
        self.inner.replace_deltas(set)
    }
}
