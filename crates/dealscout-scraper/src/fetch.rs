//! HTTP page fetching for the extraction strategies.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};

use dealscout_core::AppConfig;

use crate::error::ScrapeError;
use crate::retry::retry_with_backoff;

/// HTTP client used by every extraction strategy.
///
/// Sends browser-like headers (user agent, referrer, Accept-Language) since
/// several storefronts serve reduced markup to obvious bot agents. Transient
/// failures (network errors, 429, 5xx) are retried with exponential backoff
/// up to `max_retries` additional attempts; other non-2xx statuses surface
/// as typed errors immediately.
pub struct PageFetcher {
    client: reqwest::Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with a fixed request timeout, header set, and
    /// retry policy. `max_retries` of `0` disables retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        referrer: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        if let Ok(value) = HeaderValue::from_str(referrer) {
            headers.insert(REFERER, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Creates a `PageFetcher` from loaded application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        Self::new(
            config.fetch_timeout_secs,
            &config.user_agent,
            &config.referrer,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    /// Fetches the HTML body of `url`, with automatic retry on transient
    /// errors.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Network`] — connection failure or timeout after all
    ///   retries exhausted.
    /// - [`ScrapeError::UnexpectedStatus`] — non-2xx response (429/5xx after
    ///   all retries exhausted; anything else immediately).
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async {
            let response =
                self.client
                    .get(url)
                    .send()
                    .await
                    .map_err(|source| ScrapeError::Network {
                        url: url.to_owned(),
                        source,
                    })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ScrapeError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }

            response.text().await.map_err(|source| ScrapeError::Network {
                url: url.to_owned(),
                source,
            })
        })
        .await
    }
}
