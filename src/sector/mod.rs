//! Security → sector resolution against a reference table.

mod matcher;

pub use matcher::{
    MIN_SHARED_CHARS, SectorMatcher, normalize_security_id, try_normalize_security_id,
};

use std::collections::HashMap;

use crate::core::{FwError, SnapshotStore};

/// Label used wherever a sector could not be resolved.
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// Resolves every id against an indexed table.
///
/// A failure for one id is logged and recorded as an unknown sector for that id only.
pub fn resolve_with<'a, I>(matcher: &SectorMatcher, ids: I) -> HashMap<String, Option<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = HashMap::new();
    for id in ids {
        if out.contains_key(id) {
            continue;
        }
        let sector = match matcher.match_sector(id) {
            Ok(s) => s.map(str::to_string),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(security_id = id, error = %_e, "sector lookup failed; treating as unknown");
                None
            }
        };
        out.insert(id.to_string(), sector);
    }
    out
}

/// Reads the reference table once and resolves every id against it.
///
/// # Errors
///
/// Propagates a failure to read the reference table.
pub async fn resolve_sectors<'a, I>(
    store: &dyn SnapshotStore,
    ids: I,
) -> Result<HashMap<String, Option<String>>, FwError>
where
    I: IntoIterator<Item = &'a str>,
{
    let table = store.read_sector_reference().await?;
    let matcher = SectorMatcher::new(&table);
    Ok(resolve_with(&matcher, ids))
}
