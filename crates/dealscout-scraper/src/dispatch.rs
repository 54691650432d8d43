//! Store registry and host-based strategy dispatch.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::ScrapeError;
use crate::strategies::StoreStrategy;

/// One registered storefront: its normalized host, display name, search
/// endpoint prefix, and extraction strategy.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// Normalized host used as the dispatch key, e.g. `"amazon.com"`.
    pub domain: String,
    pub display_name: String,
    /// Search endpoint prefix; the percent-encoded query is appended.
    pub search_base: String,
    pub strategy: StoreStrategy,
}

/// An ephemeral search target for one store during a batch.
#[derive(Debug, Clone)]
pub struct StoreTarget {
    pub domain: String,
    pub display_name: String,
    pub search_url: String,
}

/// Maps normalized hosts to extraction strategies.
///
/// An explicit, constructed value — build one with
/// [`ScraperRegistry::with_default_stores`] (or a custom entry list in
/// tests) and hand it to the orchestrator. URL dispatch falls back to the
/// generic strategy on a miss; explicit store lookup does not.
#[derive(Debug, Clone)]
pub struct ScraperRegistry {
    entries: Vec<StoreEntry>,
}

impl ScraperRegistry {
    #[must_use]
    pub fn new(entries: Vec<StoreEntry>) -> Self {
        Self { entries }
    }

    /// The stock registry: Amazon, eBay, Walmart, and Best Buy with their
    /// real search endpoints.
    #[must_use]
    pub fn with_default_stores() -> Self {
        Self::new(vec![
            StoreEntry {
                domain: "amazon.com".to_owned(),
                display_name: "Amazon".to_owned(),
                search_base: "https://www.amazon.com/s?k=".to_owned(),
                strategy: StoreStrategy::Amazon,
            },
            StoreEntry {
                domain: "ebay.com".to_owned(),
                display_name: "eBay".to_owned(),
                search_base: "https://www.ebay.com/sch/i.html?_nkw=".to_owned(),
                strategy: StoreStrategy::Ebay,
            },
            StoreEntry {
                domain: "walmart.com".to_owned(),
                display_name: "Walmart".to_owned(),
                search_base: "https://www.walmart.com/search?q=".to_owned(),
                strategy: StoreStrategy::Walmart,
            },
            StoreEntry {
                domain: "bestbuy.com".to_owned(),
                display_name: "Best Buy".to_owned(),
                search_base: "https://www.bestbuy.com/site/searchpage.jsp?st=".to_owned(),
                strategy: StoreStrategy::BestBuy,
            },
        ])
    }

    #[must_use]
    pub fn entries(&self) -> &[StoreEntry] {
        &self.entries
    }

    /// Resolves a product URL to its store's entry by exact host match.
    /// `None` means the host is unregistered and the caller should use
    /// [`StoreStrategy::Generic`].
    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<&StoreEntry> {
        let host = normalize_host(url);
        self.entries.iter().find(|entry| entry.domain == host)
    }

    /// Resolves an explicitly named store. Unlike [`Self::resolve`] there
    /// is no generic fallback: asking for an unregistered store's search
    /// endpoint is a contract violation.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::UnknownStore`] when `domain` is not
    /// registered.
    pub fn resolve_for_store(&self, domain: &str) -> Result<&StoreEntry, ScrapeError> {
        self.entries
            .iter()
            .find(|entry| entry.domain == domain)
            .ok_or_else(|| ScrapeError::UnknownStore {
                domain: domain.to_owned(),
            })
    }

    /// Builds one search target per registered store for `query`.
    #[must_use]
    pub fn store_targets(&self, query: &str) -> Vec<StoreTarget> {
        self.entries
            .iter()
            .map(|entry| StoreTarget {
                domain: entry.domain.clone(),
                display_name: entry.display_name.clone(),
                search_url: search_url(entry, query),
            })
            .collect()
    }
}

/// Builds the store's search URL for `query`, percent-encoding the term.
#[must_use]
pub fn search_url(entry: &StoreEntry, query: &str) -> String {
    let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
    format!("{}{encoded}", entry.search_base)
}

/// Normalizes a URL or bare domain to its dispatch key: lower-cased host
/// with the scheme and a leading `www.` stripped, truncated at the first
/// `/`.
#[must_use]
pub fn normalize_host(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    without_www
        .split('/')
        .next()
        .unwrap_or(without_www)
        .to_owned()
}
