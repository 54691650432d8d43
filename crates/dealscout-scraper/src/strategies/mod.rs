//! Per-store extraction strategies.
//!
//! One module per supported storefront (Amazon, eBay, Walmart, Best Buy)
//! plus a generic metadata fallback for everything else. Each strategy
//! extracts fields through a prioritized chain of patterns over the raw
//! HTML; the first pattern yielding a non-empty, parseable value wins, and
//! a numeric parse failure leaves the field absent rather than failing the
//! extraction.

mod amazon;
mod bestbuy;
mod ebay;
mod generic;
mod walmart;

use dealscout_core::ProductRecord;

use crate::error::ScrapeError;
use crate::fetch::PageFetcher;

/// Placeholder title produced when no title pattern matched; validation
/// discards records carrying it.
pub const NO_TITLE_FOUND: &str = "No title found";

/// Extraction strategy for one storefront, selected by the registry.
///
/// Modeled as a tagged enum rather than trait objects so the full strategy
/// set is an explicit, constructed value with no global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStrategy {
    Amazon,
    Ebay,
    Walmart,
    BestBuy,
    /// Document-metadata fallback for unrecognized hosts. Handles direct
    /// URLs only; no search endpoint is known for an arbitrary host, so
    /// name search always fails.
    Generic,
}

impl StoreStrategy {
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            StoreStrategy::Amazon => "Amazon",
            StoreStrategy::Ebay => "eBay",
            StoreStrategy::Walmart => "Walmart",
            StoreStrategy::BestBuy => "Best Buy",
            StoreStrategy::Generic => "Generic",
        }
    }

    /// Scrapes a product page into a [`ProductRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Network`] / [`ScrapeError::UnexpectedStatus`]
    /// when the page cannot be fetched, and [`ScrapeError::Parse`] when the
    /// page yields nothing usable at all.
    pub async fn scrape(
        &self,
        fetcher: &PageFetcher,
        url: &str,
    ) -> Result<ProductRecord, ScrapeError> {
        match self {
            StoreStrategy::Amazon => amazon::scrape(fetcher, url).await,
            StoreStrategy::Ebay => ebay::scrape(fetcher, url).await,
            StoreStrategy::Walmart => walmart::scrape(fetcher, url).await,
            StoreStrategy::BestBuy => bestbuy::scrape(fetcher, url).await,
            StoreStrategy::Generic => generic::scrape(fetcher, url).await,
        }
    }

    /// Fetches a search results page, takes the first organic
    /// (non-sponsored) result, and scrapes its product page.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::NoSearchResults`] when no organic result link
    /// is present, [`ScrapeError::SearchUnsupported`] for the generic
    /// strategy, and any error from the delegated [`Self::scrape`].
    pub async fn scrape_first_search_result(
        &self,
        fetcher: &PageFetcher,
        search_url: &str,
        query: &str,
    ) -> Result<ProductRecord, ScrapeError> {
        match self {
            StoreStrategy::Amazon => amazon::scrape_first_search_result(fetcher, search_url, query).await,
            StoreStrategy::Ebay => ebay::scrape_first_search_result(fetcher, search_url, query).await,
            StoreStrategy::Walmart => {
                walmart::scrape_first_search_result(fetcher, search_url, query).await
            }
            StoreStrategy::BestBuy => {
                bestbuy::scrape_first_search_result(fetcher, search_url, query).await
            }
            StoreStrategy::Generic => Err(ScrapeError::SearchUnsupported {
                store: self.display_name().to_owned(),
            }),
        }
    }
}

/// Resolves a possibly-relative href from a results page against the page
/// URL's origin.
pub(crate) fn resolve_href(page_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_owned();
    }
    let origin = page_origin(page_url);
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}

/// Extracts `scheme://host` from a URL, without the path.
fn page_origin(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.trim_end_matches('/').to_owned();
    };
    let rest = &url[scheme_end + 3..];
    let host_end = rest.find('/').unwrap_or(rest.len());
    format!("{}{}", &url[..scheme_end + 3], &rest[..host_end])
}

/// Unescapes the handful of HTML entities that show up in captured titles
/// and hrefs.
pub(crate) fn unescape_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
}
