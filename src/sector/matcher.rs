use std::collections::HashMap;

use crate::core::{FwError, SectorRef};

/// Shortest common run of characters accepted by the fuzzy matching steps.
pub const MIN_SHARED_CHARS: usize = 3;

/// Uppercases, trims and collapses internal whitespace to single spaces.
#[must_use]
pub fn normalize_security_id(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Like [`normalize_security_id`] but rejects identifiers that normalize to nothing.
///
/// # Errors
///
/// Returns [`FwError::InvalidSecurityId`] for blank input.
pub fn try_normalize_security_id(raw: &str) -> Result<String, FwError> {
    let id = normalize_security_id(raw);
    if id.is_empty() {
        return Err(FwError::InvalidSecurityId(raw.to_string()));
    }
    Ok(id)
}

fn first_token(normalized: &str) -> &str {
    normalized.split(' ').next().unwrap_or(normalized)
}

#[derive(Debug, Clone)]
struct Entry {
    token: String,
    sector: String,
}

/// Matches raw security identifiers (tickers or issuer names) against a sector table.
///
/// Matching runs in three steps and the first step that finds something wins:
/// 1. exact match of the normalized identifier;
/// 2. prefix match between first tokens, either direction, sharing at least
///    [`MIN_SHARED_CHARS`] leading characters;
/// 3. substring containment between first tokens, the shorter one being at least
///    [`MIN_SHARED_CHARS`] long.
///
/// Within steps 2 and 3 the candidate with the longest overlap wins; ties go to the
/// entry that appears first in the table.
#[derive(Debug, Clone, Default)]
pub struct SectorMatcher {
    exact: HashMap<String, usize>,
    entries: Vec<Entry>,
}

impl SectorMatcher {
    /// Indexes a reference table. Entries with a blank id or sector are skipped.
    #[must_use]
    pub fn new(table: &[SectorRef]) -> Self {
        let mut exact = HashMap::with_capacity(table.len());
        let mut entries = Vec::with_capacity(table.len());
        for r in table {
            let id = normalize_security_id(&r.reference_id);
            let sector = r.sector.trim();
            if id.is_empty() || sector.is_empty() {
                continue;
            }
            let idx = entries.len();
            entries.push(Entry {
                token: first_token(&id).to_string(),
                sector: sector.to_string(),
            });
            exact.entry(id).or_insert(idx);
        }
        Self { exact, entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the sector of `raw`, or `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`FwError::InvalidSecurityId`] when `raw` is blank.
    pub fn match_sector(&self, raw: &str) -> Result<Option<&str>, FwError> {
        let id = try_normalize_security_id(raw)?;

        if let Some(&idx) = self.exact.get(&id) {
            return Ok(Some(self.entries[idx].sector.as_str()));
        }

        let token = first_token(&id);
        if let Some(e) = self.best(|t| prefix_overlap(token, t)) {
            return Ok(Some(e.sector.as_str()));
        }
        Ok(self
            .best(|t| containment_overlap(token, t))
            .map(|e| e.sector.as_str()))
    }

    fn best(&self, overlap: impl Fn(&str) -> Option<usize>) -> Option<&Entry> {
        let mut best: Option<(usize, &Entry)> = None;
        for e in &self.entries {
            if let Some(n) = overlap(&e.token)
                && best.is_none_or(|(m, _)| n > m)
            {
                best = Some((n, e));
            }
        }
        best.map(|(_, e)| e)
    }
}

/// Length of the shorter token when one is a prefix of the other.
fn prefix_overlap(a: &str, b: &str) -> Option<usize> {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    (short.chars().count() >= MIN_SHARED_CHARS && long.starts_with(short))
        .then(|| short.chars().count())
}

/// Length of the shorter token when it occurs anywhere inside the other.
fn containment_overlap(a: &str, b: &str) -> Option<usize> {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    (short.chars().count() >= MIN_SHARED_CHARS && long.contains(short))
        .then(|| short.chars().count())
}
