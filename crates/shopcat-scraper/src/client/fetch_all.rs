//! Multi-page product fetch loop for `ShopifyClient`.

use shopcat_core::ScrapeOptions;

use crate::error::ScraperError;
use crate::types::RawProduct;

use super::{listing_page_url, ShopifyClient};

impl ShopifyClient {
    /// Fetches every page of a product listing such as
    /// `<origin>/collections/<handle>/products.json`.
    ///
    /// Page 1 is requested as `?limit=<page_size>&page=1`; the rest follow
    /// the rules of [`Self::fetch_remaining_pages`].
    ///
    /// # Errors
    ///
    /// Returns the first page's error. Failures on later pages are logged and
    /// end the loop with what was accumulated.
    pub async fn fetch_all_pages(
        &self,
        listing: &str,
        options: &ScrapeOptions,
    ) -> Result<Vec<RawProduct>, ScraperError> {
        let first_page = self
            .fetch_products(&listing_page_url(listing, options.page_size, 1))
            .await?;
        if first_page.len() < options.page_size as usize {
            return Ok(first_page);
        }
        Ok(self
            .fetch_remaining_pages(listing, first_page, options)
            .await)
    }

    /// Extends an already-fetched first page with pages `2, 3, …` of
    /// `<listing>?limit=<page_size>&page=<n>`.
    ///
    /// Stops on the first empty page, after appending a short page, after
    /// page `max_pages`, or on the first failed request. A failure never
    /// discards what was already accumulated; it is logged and the loop ends.
    ///
    /// `page_delay` is slept before every page request.
    pub async fn fetch_remaining_pages(
        &self,
        listing: &str,
        first_page: Vec<RawProduct>,
        options: &ScrapeOptions,
    ) -> Vec<RawProduct> {
        let mut all_products = first_page;
        let page_size = options.page_size as usize;

        for page in 2..=options.max_pages {
            if !options.page_delay.is_zero() {
                tokio::time::sleep(options.page_delay).await;
            }

            let url = listing_page_url(listing, options.page_size, page);
            match self.fetch_products(&url).await {
                Ok(batch) if batch.is_empty() => {
                    tracing::debug!(listing, page, "empty page, end of listing");
                    break;
                }
                Ok(batch) => {
                    let fetched = batch.len();
                    all_products.extend(batch);
                    tracing::info!(
                        listing,
                        page,
                        fetched,
                        total = all_products.len(),
                        "appended product page"
                    );
                    if fetched < page_size {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        listing,
                        page,
                        kind = ?e.kind(),
                        error = %e,
                        "product page failed, keeping accumulated results"
                    );
                    break;
                }
            }
        }

        all_products
    }
}
