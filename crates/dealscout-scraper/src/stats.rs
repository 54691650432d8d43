//! In-memory search statistics.
//!
//! The orchestrator reports each search term (plus the product names it
//! surfaced) here, fire-and-forget; nothing in the pipeline consumes the
//! recorded data. Read accessors exist for a presentation layer to expose.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
struct TermStats {
    count: u64,
    last_searched: DateTime<Utc>,
    related: BTreeSet<String>,
}

/// One entry of [`SearchStats::top_searches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTermCount {
    pub term: String,
    pub count: u64,
    pub last_searched: DateTime<Utc>,
}

/// Thread-safe search counters keyed by normalized term.
#[derive(Debug, Default)]
pub struct SearchStats {
    inner: Mutex<HashMap<String, TermStats>>,
}

impl SearchStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one search for `term`, bumping its counter, stamping the
    /// search time, and unioning `related_terms` into its related set.
    /// Blank terms are ignored.
    pub fn record_search<S: AsRef<str>>(&self, term: &str, related_terms: &[S]) {
        let normalized = normalize_term(term);
        if normalized.is_empty() {
            return;
        }

        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = guard.entry(normalized).or_insert_with(|| TermStats {
            count: 0,
            last_searched: Utc::now(),
            related: BTreeSet::new(),
        });
        entry.count += 1;
        entry.last_searched = Utc::now();
        entry.related.extend(
            related_terms
                .iter()
                .map(|t| normalize_term(t.as_ref()))
                .filter(|t| !t.is_empty()),
        );
    }

    /// Snapshot of all search counters.
    #[must_use]
    pub fn search_counts(&self) -> HashMap<String, u64> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .iter()
            .map(|(term, stats)| (term.clone(), stats.count))
            .collect()
    }

    /// The most-searched terms in descending count order, optionally
    /// limited.
    #[must_use]
    pub fn top_searches(&self, limit: Option<usize>) -> Vec<SearchTermCount> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<SearchTermCount> = guard
            .iter()
            .map(|(term, stats)| SearchTermCount {
                term: term.clone(),
                count: stats.count,
                last_searched: stats.last_searched,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        entries
    }

    /// Related terms recorded for `term` (empty when the term is unknown).
    #[must_use]
    pub fn related_searches(&self, term: &str) -> BTreeSet<String> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(&normalize_term(term))
            .map(|stats| stats.related.clone())
            .unwrap_or_default()
    }
}

fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}
