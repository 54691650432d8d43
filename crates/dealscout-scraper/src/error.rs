use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// HTTP client could not be constructed (e.g., invalid TLS config).
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network failure fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// A mandatory page section could not be parsed.
    #[error("no parseable product at {url}: {reason}")]
    Parse { url: String, reason: String },

    /// The search results page held no organic (non-sponsored) result.
    #[error("no organic search results for \"{query}\" on {store}")]
    NoSearchResults { store: String, query: String },

    /// Name search was requested against a scraper that only handles
    /// direct product URLs.
    #[error("{store} scraping requires a direct product URL; name search is not supported")]
    SearchUnsupported { store: String },

    /// An explicitly named store has no registered scraper. Unlike URL
    /// dispatch, store-by-name lookup has no generic fallback.
    #[error("no scraper registered for store domain: {domain}")]
    UnknownStore { domain: String },
}
