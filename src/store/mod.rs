//! Snapshot store adapters.
//!
//! - [`MemoryStore`]: in-process data, for hosts that already hold snapshots and for tests.
//! - [`CachedStore`]: a TTL cache in front of any other store.
//! - [`RemoteStore`]: a JSON-over-HTTP client for a host-operated holdings service.

mod cached;
mod memory;
mod remote;

pub use cached::{CacheMode, CachedStore};
pub use memory::{MemoryStore, ReadCounts};
pub use remote::{Backoff, RemoteStore, RemoteStoreBuilder, RetryConfig};
