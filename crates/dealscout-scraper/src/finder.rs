//! Concurrent multi-store query orchestration.
//!
//! Two entry modes: a free-text product name fans out to every registered
//! store's search endpoint; a product URL is scraped directly and its
//! normalized title is then searched on the remaining stores. Branches run
//! concurrently on a bounded pool with an explicit join — a failing branch
//! is logged and contributes nothing, and never aborts its siblings.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use dealscout_core::{AppConfig, ProductRecord};

use crate::dispatch::{normalize_host, search_url, ScraperRegistry, StoreEntry, StoreTarget};
use crate::error::ScrapeError;
use crate::fetch::PageFetcher;
use crate::normalize::normalize_product_name;
use crate::stats::SearchStats;
use crate::strategies::StoreStrategy;
use crate::validate::{make_record_key, validation_error};

/// Orchestrates concurrent store queries and assembles the validated batch.
///
/// The registry and fetcher are explicit constructed values; tests inject a
/// registry whose entries point at a local mock server.
pub struct ProductFinder {
    registry: ScraperRegistry,
    fetcher: PageFetcher,
    max_concurrent: usize,
    stats: Option<Arc<SearchStats>>,
}

impl ProductFinder {
    #[must_use]
    pub fn new(registry: ScraperRegistry, fetcher: PageFetcher, max_concurrent: usize) -> Self {
        Self {
            registry,
            fetcher,
            max_concurrent: max_concurrent.max(1),
            stats: None,
        }
    }

    /// Builds a finder with the stock store registry and a fetcher derived
    /// from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        Ok(Self::new(
            ScraperRegistry::with_default_stores(),
            PageFetcher::from_config(config)?,
            config.max_concurrent_stores,
        ))
    }

    /// Attaches a search-statistics recorder. Each completed search reports
    /// its normalized term and the product names it surfaced,
    /// fire-and-forget.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<SearchStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Searches all stores for `input` — a product name or a product URL —
    /// and returns the validated records sorted ascending by price.
    ///
    /// Callers are expected to reject empty/blank input at the boundary; a
    /// blank query simply produces an empty batch here. An empty result is
    /// an outcome, not an error.
    pub async fn search(&self, input: &str) -> Vec<ProductRecord> {
        let trimmed = input.trim();

        let mut records = if trimmed.starts_with("http") {
            self.search_from_url(trimmed).await
        } else {
            self.search_by_name(trimmed).await
        };

        // User-facing order is always imposed here, after the join; branch
        // completion order carries no meaning.
        records.sort_by(|a, b| {
            a.current_price
                .unwrap_or(0.0)
                .total_cmp(&b.current_price.unwrap_or(0.0))
        });
        records
    }

    /// Name mode: one search per registered store, concurrently. Failures
    /// and validation rejections are logged and dropped.
    pub async fn search_by_name(&self, query: &str) -> Vec<ProductRecord> {
        let results: Vec<Option<ProductRecord>> = stream::iter(self.registry.entries())
            .map(|entry| self.scrape_store_search(entry, query))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let records: Vec<ProductRecord> = results.into_iter().flatten().collect();
        self.record_stats(query, &records);
        records
    }

    /// URL mode: scrape the seed URL, then search the remaining stores for
    /// its normalized title and merge.
    ///
    /// When the seed record cannot be extracted or fails validation the
    /// whole batch is empty: without a trusted seed there is no reliable
    /// cross-store search term.
    pub async fn search_from_url(&self, url: &str) -> Vec<ProductRecord> {
        let origin_domain = normalize_host(url);

        let seed = match self.scrape_product(url).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(url, error = %e, "seed URL extraction failed — returning empty batch");
                return Vec::new();
            }
        };

        if let Some(reason) = validation_error(&seed) {
            tracing::warn!(url, reason, "seed record rejected — returning empty batch");
            return Vec::new();
        }

        let search_term = normalize_product_name(&seed.name);
        tracing::debug!(url, search_term = %search_term, "searching remaining stores for seed product");

        let other_entries: Vec<&StoreEntry> = self
            .registry
            .entries()
            .iter()
            .filter(|entry| entry.domain != origin_domain)
            .collect();

        let results: Vec<Option<ProductRecord>> = stream::iter(other_entries)
            .map(|entry| self.scrape_store_search(entry, &search_term))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(make_record_key(&seed));

        let mut records = vec![seed];
        for record in results.into_iter().flatten() {
            if seen.insert(make_record_key(&record)) {
                records.push(record);
            }
        }

        self.record_stats(&search_term, &records);
        records
    }

    /// Searches one explicitly named store. Unlike the batch entry points
    /// there is no generic fallback and no error swallowing: an
    /// unregistered domain or a failed extraction propagates to the caller.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::UnknownStore`] for an unregistered domain, plus any
    /// fetch/parse error from the store's strategy.
    pub async fn search_store(
        &self,
        domain: &str,
        query: &str,
    ) -> Result<ProductRecord, ScrapeError> {
        let entry = self.registry.resolve_for_store(domain)?;
        entry
            .strategy
            .scrape_first_search_result(&self.fetcher, &search_url(entry, query), query)
            .await
    }

    /// Scrapes a single product URL, dispatching to the store's strategy by
    /// host; unregistered hosts use the generic metadata strategy.
    ///
    /// # Errors
    ///
    /// Any fetch or parse error from the selected strategy.
    pub async fn scrape_product(&self, url: &str) -> Result<ProductRecord, ScrapeError> {
        match self.registry.resolve(url) {
            Some(entry) => entry.strategy.scrape(&self.fetcher, url).await,
            None => StoreStrategy::Generic.scrape(&self.fetcher, url).await,
        }
    }

    /// One branch of a search batch: errors and rejections become `None`
    /// so sibling branches are unaffected.
    async fn scrape_store_search(&self, entry: &StoreEntry, query: &str) -> Option<ProductRecord> {
        let target = StoreTarget {
            domain: entry.domain.clone(),
            display_name: entry.display_name.clone(),
            search_url: search_url(entry, query),
        };

        let result = entry
            .strategy
            .scrape_first_search_result(&self.fetcher, &target.search_url, query)
            .await;

        match result {
            Ok(record) => match validation_error(&record) {
                None => {
                    tracing::debug!(
                        store = %target.display_name,
                        price = %record.formatted_price(),
                        "store search succeeded"
                    );
                    Some(record)
                }
                Some(reason) => {
                    tracing::debug!(store = %target.display_name, query, reason, "record discarded");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(store = %target.display_name, query, error = %e, "store search failed");
                None
            }
        }
    }

    fn record_stats(&self, term: &str, records: &[ProductRecord]) {
        if let Some(stats) = &self.stats {
            let related: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
            stats.record_search(term, &related);
        }
    }
}
