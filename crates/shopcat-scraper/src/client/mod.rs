//! HTTP client for a storefront's public JSON and HTML surfaces.

mod fetch_all;
mod origin;

use std::time::Duration;

use reqwest::Client;
use shopcat_core::AppConfig;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{records_from_body, RawCollection, RawProduct};

pub use origin::normalize_store_url;
// Re-export for test visibility via `use super::*`
#[cfg(test)]
use origin::extract_domain;

const JSON_ACCEPT: &str = "application/json,text/html;q=0.9,*/*;q=0.8";
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// HTTP client for storefront listings.
///
/// Every request carries a browser-like header set. 429, 404, and other
/// non-2xx responses surface as typed errors. Transient errors (429, 5xx,
/// network failures) are retried with exponential backoff up to
/// `max_retries` additional attempts.
pub struct ShopifyClient {
    pub(super) client: Client,
    /// Maximum number of retry attempts after the first failure.
    pub(super) max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    pub(super) backoff_base_secs: u64,
}

impl ShopifyClient {
    /// Creates a `ShopifyClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// `timeout_secs` bounds each request end to end; a request that exceeds
    /// it fails like any other network error.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from the scraper settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )
    }

    /// Fetches the `products` array from a JSON listing URL.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status (5xx retried, 4xx not).
    /// - [`ScraperError::Http`]: network, timeout or TLS failure after all retries exhausted.
    /// - [`ScraperError::Deserialize`]: body is not JSON (not retried).
    /// - [`ScraperError::MissingField`]: body has no `products` field.
    pub async fn fetch_products(&self, url: &str) -> Result<Vec<RawProduct>, ScraperError> {
        let body = self.get_text(url, JSON_ACCEPT).await?;
        records_from_body(&body, "products", url)
    }

    /// Fetches the `collections` array from a JSON listing URL.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_products`], with `collections` as the expected field.
    pub async fn fetch_collections(&self, url: &str) -> Result<Vec<RawCollection>, ScraperError> {
        let body = self.get_text(url, JSON_ACCEPT).await?;
        records_from_body(&body, "collections", url)
    }

    /// Fetches a storefront HTML page.
    ///
    /// # Errors
    ///
    /// Returns the same transport and status errors as [`Self::fetch_products`].
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        self.get_text(url, HTML_ACCEPT).await
    }

    async fn get_text(&self, url: &str, accept: &'static str) -> Result<String, ScraperError> {
        let max_retries = self.max_retries;
        let backoff_base_secs = self.backoff_base_secs;

        retry_with_backoff(max_retries, backoff_base_secs, || {
            let url = url.to_owned();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, accept)
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);

                    let domain = origin::extract_domain(&url);
                    return Err(ScraperError::RateLimited {
                        domain,
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }
}

/// `<listing>?limit=<page_size>&page=<page>`, where `listing` is a full
/// listing URL such as `<origin>/products.json`.
pub(crate) fn listing_page_url(listing: &str, page_size: u32, page: u32) -> String {
    format!("{listing}?limit={page_size}&page={page}")
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
