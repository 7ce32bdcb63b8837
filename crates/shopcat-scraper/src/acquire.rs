//! Acquisition entry points: the ordered strategy chain that turns a
//! storefront address into canonical records.
//!
//! Only [`ScraperError::InvalidInput`] escapes from here. Every upstream
//! failure is logged and treated as "this strategy produced nothing", so a
//! store that blocks every strategy yields a successful, empty acquisition.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use shopcat_core::{Collection, Product, ScrapeOptions};

use crate::association::map_collections;
use crate::client::{normalize_store_url, ShopifyClient};
use crate::error::ScraperError;
use crate::html;
use crate::normalize::{normalize_collection, normalize_product};

/// Which record family an acquisition returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Products,
    Collections,
}

impl RecordKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Collections => "collections",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "collections" => Ok(Self::Collections),
            other => Err(ScraperError::InvalidInput {
                input: other.to_owned(),
                reason: "unknown record type; use \"products\" or \"collections\"".to_owned(),
            }),
        }
    }
}

/// Canonical records of one kind. Serializes as `{"products": [...]}` or
/// `{"collections": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogRecords {
    Products(Vec<Product>),
    Collections(Vec<Collection>),
}

impl CatalogRecords {
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Products(_) => RecordKind::Products,
            Self::Collections(_) => RecordKind::Collections,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Products(p) => p.len(),
            Self::Collections(c) => c.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of one acquisition call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acquisition {
    #[serde(flatten)]
    pub records: CatalogRecords,
    pub total: usize,
    /// `true` iff `total` equals the requested limit. A store with exactly
    /// `limit` items reports `true` even though nothing more exists.
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    /// Normalized store origin.
    pub store: String,
}

/// Structured product listings, tried in order until one yields records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStrategy {
    /// `/products.json`
    BasicListing,
    /// `/collections/all/products.json`
    CatchAllCollection,
}

impl ProductStrategy {
    pub const CHAIN: [Self; 2] = [Self::BasicListing, Self::CatchAllCollection];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::BasicListing => "/products.json",
            Self::CatchAllCollection => "/collections/all/products.json",
        }
    }

    fn first_page_url(self, origin: &str, page_size: u32) -> String {
        format!("{origin}{}?limit={page_size}", self.path())
    }
}

/// Acquires records of `kind` from the store at `store_url`.
///
/// `page` is forwarded to the collections listing only; the product path
/// always crawls every page.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidInput`] if `store_url` is not a usable
/// absolute URL. No request is made in that case.
pub async fn acquire(
    client: &ShopifyClient,
    store_url: &str,
    kind: RecordKind,
    page: u32,
    limit: usize,
    options: &ScrapeOptions,
) -> Result<Acquisition, ScraperError> {
    match kind {
        RecordKind::Products => acquire_products(client, store_url, limit, options).await,
        RecordKind::Collections => acquire_collections(client, store_url, page, limit).await,
    }
}

/// Acquires every product of a store.
///
/// Builds the collection reverse index, walks [`ProductStrategy::CHAIN`]
/// (extending the first non-empty listing with the pagination loop), and
/// falls back to HTML listing pages when both structured listings are empty
/// or fail. HTML results are capped at `limit` and always report
/// `has_more = false`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidInput`] if `store_url` cannot be normalized.
pub async fn acquire_products(
    client: &ShopifyClient,
    store_url: &str,
    limit: usize,
    options: &ScrapeOptions,
) -> Result<Acquisition, ScraperError> {
    let origin = normalize_store_url(store_url)?;
    let memberships = map_collections(client, &origin, options).await;

    let product_listing = format!("{origin}{}", ProductStrategy::BasicListing.path());
    let mut structured = None;
    for strategy in ProductStrategy::CHAIN {
        let url = strategy.first_page_url(&origin, options.page_size);
        match client.fetch_products(&url).await {
            Ok(first_page) if !first_page.is_empty() => {
                tracing::info!(
                    %origin,
                    ?strategy,
                    count = first_page.len(),
                    "structured listing succeeded"
                );
                structured = Some(
                    client
                        .fetch_remaining_pages(&product_listing, first_page, options)
                        .await,
                );
                break;
            }
            Ok(_) => tracing::info!(%origin, ?strategy, "structured listing returned no products"),
            Err(e) => tracing::warn!(
                %origin,
                ?strategy,
                kind = ?e.kind(),
                error = %e,
                "structured listing failed"
            ),
        }
    }

    let from_html = structured.is_none();
    let raw = match structured {
        Some(raw) => raw,
        None => {
            tracing::info!(%origin, "falling back to HTML listing pages");
            html::scrape_products(client, &origin, limit).await
        }
    };

    let fetched_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let products: Vec<Product> = raw
        .into_iter()
        .enumerate()
        .map(|(i, p)| normalize_product(p, i, &origin, &memberships, &fetched_at))
        .collect();

    let total = products.len();
    tracing::info!(%origin, total, from_html, "product acquisition finished");
    Ok(Acquisition {
        records: CatalogRecords::Products(products),
        total,
        has_more: !from_html && total == limit,
        store: origin,
    })
}

/// Acquires one page of a store's collections.
///
/// Requests `/collections.json?limit=<limit>&page=<page>`; if that fails or
/// lacks a `collections` field, scrapes the `/collections` HTML index instead
/// (`has_more = false`). An empty but well-formed listing is returned as is.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidInput`] if `store_url` cannot be normalized.
pub async fn acquire_collections(
    client: &ShopifyClient,
    store_url: &str,
    page: u32,
    limit: usize,
) -> Result<Acquisition, ScraperError> {
    let origin = normalize_store_url(store_url)?;

    let url = format!("{origin}/collections.json?limit={limit}&page={page}");
    let (raw, from_html) = match client.fetch_collections(&url).await {
        Ok(raw) => (raw, false),
        Err(e) => {
            tracing::warn!(
                %origin,
                kind = ?e.kind(),
                error = %e,
                "collections listing failed, falling back to HTML"
            );
            (html::scrape_collections(client, &origin, limit).await, true)
        }
    };

    let collections: Vec<Collection> = raw
        .into_iter()
        .enumerate()
        .map(|(i, c)| normalize_collection(c, i, &origin))
        .collect();

    let total = collections.len();
    tracing::info!(%origin, total, from_html, "collection acquisition finished");
    Ok(Acquisition {
        records: CatalogRecords::Collections(collections),
        total,
        has_more: !from_html && total == limit,
        store: origin,
    })
}
