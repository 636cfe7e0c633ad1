//! JSON-over-HTTP store for a host-operated holdings service.
//!
//! Endpoints are resolved against the base URL:
//! - `GET snapshots?ids=a,b`              → `{"snapshots": [{"filing_id", "holdings": [...]}]}`
//! - `GET filings/{id}`                   → a single filing object, 404 when unknown
//! - `GET funds/{fund}/filings?status=PARSED&limit=N` → `{"filings": [...]}`
//! - `GET sectors`                        → `{"sectors": [{"reference_id", "sector"}]}`
//! - `PUT funds/{fund}/filings/{id}/deltas` with the full delta set; the service replaces atomically.

mod retry;
mod wire;

pub use retry::{Backoff, RetryConfig};

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::core::{
    DeltaSet, DeltaSink, Filing, FwError, SectorRef, ServiceFuture, Snapshot, SnapshotStore,
};
use retry::send_with_retry;
use wire::{DeltasPayload, FilingNode, FilingsEnvelope, SectorsEnvelope, SnapshotsEnvelope};

const USER_AGENT: &str = concat!("fundwatch-rs/", env!("CARGO_PKG_VERSION"));

/// A [`SnapshotStore`] and [`DeltaSink`] backed by a remote JSON service.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    http: Client,
    base: Url,
    retry: RetryConfig,
}

impl RemoteStore {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> RemoteStoreBuilder {
        RemoteStoreBuilder::default()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FwError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| FwError::InvalidParams(format!("base URL cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, FwError> {
        let resp = send_with_retry(self.http.get(url.clone()), &self.retry).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(FwError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }
        let text = resp.text().await?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    async fn get_required<T: DeserializeOwned>(&self, url: Url) -> Result<T, FwError> {
        let shown = url.to_string();
        self.get_json(url).await?.ok_or(FwError::Status {
            status: StatusCode::NOT_FOUND.as_u16(),
            url: shown,
        })
    }

    async fn fetch_snapshots(&self, ids: &[String]) -> Result<HashMap<String, Snapshot>, FwError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut url = self.endpoint(&["snapshots"])?;
        url.query_pairs_mut().append_pair("ids", &ids.join(","));
        let env: SnapshotsEnvelope = self.get_required(url).await?;
        let mut out = HashMap::with_capacity(env.snapshots.len());
        for node in env.snapshots {
            let snap = node.into_snapshot()?;
            out.insert(snap.filing_id.clone(), snap);
        }
        Ok(out)
    }
}

impl SnapshotStore for RemoteStore {
    fn read_snapshot<'a>(&'a self, filing_id: &'a str) -> ServiceFuture<'a, Snapshot> {
        Box::pin(async move {
            let ids = [filing_id.to_string()];
            let mut map = self.fetch_snapshots(&ids).await?;
            Ok(map
                .remove(filing_id)
                .unwrap_or_else(|| Snapshot::empty(filing_id)))
        })
    }

    fn read_snapshots<'a>(
        &'a self,
        filing_ids: &'a [String],
    ) -> ServiceFuture<'a, HashMap<String, Snapshot>> {
        Box::pin(self.fetch_snapshots(filing_ids))
    }

    fn read_filing<'a>(&'a self, filing_id: &'a str) -> ServiceFuture<'a, Option<Filing>> {
        Box::pin(async move {
            let url = self.endpoint(&["filings", filing_id])?;
            let node: Option<FilingNode> = self.get_json(url).await?;
            node.map(FilingNode::into_filing).transpose()
        })
    }

    fn read_recent_parsed_filings<'a>(
        &'a self,
        fund_id: &'a str,
        limit: usize,
    ) -> ServiceFuture<'a, Vec<Filing>> {
        Box::pin(async move {
            let mut url = self.endpoint(&["funds", fund_id, "filings"])?;
            url.query_pairs_mut()
                .append_pair("status", "PARSED")
                .append_pair("limit", &limit.to_string());
            let env: FilingsEnvelope = self.get_required(url).await?;
            let filings = env
                .filings
                .into_iter()
                .map(FilingNode::into_filing)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(crate::trend::recent_parsed(filings, limit))
        })
    }

    fn read_sector_reference(&self) -> ServiceFuture<'_, Vec<SectorRef>> {
        Box::pin(async move {
            let url = self.endpoint(&["sectors"])?;
            let env: SectorsEnvelope = self.get_required(url).await?;
            Ok(env
                .sectors
                .into_iter()
                .filter_map(wire::SectorNode::into_ref)
                .collect())
        })
    }
}

impl DeltaSink for RemoteStore {
    fn replace_deltas<'a>(&'a self, set: &'a DeltaSet) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            let url = self.endpoint(&[
                "funds",
                set.fund_id.as_str(),
                "filings",
                set.filing_id_new.as_str(),
                "deltas",
            ])?;
            let req = self.http.put(url.clone()).json(&DeltasPayload::from(set));
            let resp = send_with_retry(req, &self.retry).await?;
            if !resp.status().is_success() {
                return Err(FwError::Status {
                    status: resp.status().as_u16(),
                    url: url.to_string(),
                });
            }
            Ok(())
        })
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct RemoteStoreBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: Option<RetryConfig>,
}

impl RemoteStoreBuilder {
    /// Base URL of the holdings service. Required.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set a global request timeout (overall). Default: none.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub const fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Set the retry policy. Default: disabled.
    #[must_use]
    pub fn retry_policy(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Builds the store.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was given or the HTTP client cannot be built.
    pub fn build(self) -> Result<RemoteStore, FwError> {
        let base = self
            .base_url
            .ok_or_else(|| FwError::InvalidParams("a base URL is required".into()))?;

        let mut httpb =
            reqwest::Client::builder().user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));
        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }

        Ok(RemoteStore {
            http: httpb.build()?,
            base,
            retry: self.retry.unwrap_or_default(),
        })
    }
}
