use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_page_size: u32,
    pub scraper_max_pages: u32,
    pub scraper_page_delay_ms: u64,
    pub scraper_collection_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
}

impl AppConfig {
    /// Pagination and politeness settings handed to the acquisition pipeline.
    #[must_use]
    pub fn scrape_options(&self) -> ScrapeOptions {
        ScrapeOptions {
            page_size: self.scraper_page_size,
            max_pages: self.scraper_max_pages,
            page_delay: Duration::from_millis(self.scraper_page_delay_ms),
            collection_delay: Duration::from_millis(self.scraper_collection_delay_ms),
        }
    }
}

/// Knobs for one acquisition call.
///
/// `page_size` is fixed for the whole pagination loop and independent of the
/// caller's overall limit. The two delays are politeness throttles between
/// consecutive upstream requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub page_size: u32,
    /// Upper bound on the page number the pagination loop will request.
    pub max_pages: u32,
    pub page_delay: Duration,
    pub collection_delay: Duration,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            page_size: 250,
            max_pages: 1000,
            page_delay: Duration::from_millis(200),
            collection_delay: Duration::from_millis(100),
        }
    }
}
