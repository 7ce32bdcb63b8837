//! Best-effort extraction from storefront theme markup.
//!
//! Used only when every JSON endpoint came back empty or failed. Records
//! built here carry no variants and no tags; prices are whatever text the
//! theme renders.
//!
//! `scraper::Html` is not `Send`, so documents are parsed and dropped inside
//! the synchronous `parse_*` functions and never held across an `.await`.

use scraper::{ElementRef, Html, Selector};

use crate::client::ShopifyClient;
use crate::types::{RawCollection, RawImage, RawProduct};

/// Collection slugs whose pages are scraped for product cards, in order.
pub const PRODUCT_LISTING_SLUGS: [&str; 3] = ["all", "featured", "new-arrivals"];

const PRODUCT_CARD: &str = ".product-item, .product-card, .grid-product__content";
const PRODUCT_TITLE: &str = ".product-title, .product-card__title, .grid-product__title";
const PRODUCT_VENDOR: &str = ".product-vendor, .vendor";
const PRODUCT_PRICE: &str = ".price, .product-price";

const COLLECTION_CARD: &str = ".collection-item, .collection-card, .grid-item";
const COLLECTION_TITLE: &str = ".collection-title, .collection-card__title, .grid-item__title";
const COLLECTION_DESCRIPTION: &str = ".collection-description";

/// Scrapes product cards from `/collections/<slug>` for each of
/// [`PRODUCT_LISTING_SLUGS`], stopping once `limit` products are collected.
///
/// A failed page is logged and skipped.
pub async fn scrape_products(
    client: &ShopifyClient,
    origin: &str,
    limit: usize,
) -> Vec<RawProduct> {
    let mut products = Vec::new();

    for slug in PRODUCT_LISTING_SLUGS {
        if products.len() >= limit {
            break;
        }
        let url = format!("{origin}/collections/{slug}");
        match client.fetch_html(&url).await {
            Ok(body) => {
                let cards = parse_product_cards(&body, products.len());
                tracing::debug!(origin, slug, found = cards.len(), "scraped product cards");
                let room = limit - products.len();
                products.extend(cards.into_iter().take(room));
            }
            Err(e) => {
                tracing::warn!(origin, slug, error = %e, "listing page unavailable, skipping");
            }
        }
    }

    products
}

/// Scrapes collection cards from `/collections`, keeping at most `limit`.
pub async fn scrape_collections(
    client: &ShopifyClient,
    origin: &str,
    limit: usize,
) -> Vec<RawCollection> {
    let url = format!("{origin}/collections");
    match client.fetch_html(&url).await {
        Ok(body) => {
            let mut collections = parse_collection_cards(&body);
            collections.truncate(limit);
            collections
        }
        Err(e) => {
            tracing::warn!(origin, error = %e, "collections index unavailable");
            Vec::new()
        }
    }
}

/// Extracts product cards from a listing page.
///
/// Synthetic ids continue from `first_index` (`html-<n>`), so ids stay
/// unique across several pages.
#[must_use]
pub fn parse_product_cards(html: &str, first_index: usize) -> Vec<RawProduct> {
    let doc = Html::parse_document(html);
    let Some(card_sel) = selector(PRODUCT_CARD) else {
        return Vec::new();
    };

    doc.select(&card_sel)
        .enumerate()
        .map(|(i, card)| RawProduct {
            id: Some(format!("html-{}", first_index + i)),
            title: first_text(card, PRODUCT_TITLE),
            handle: first_link(card).and_then(|href| handle_from_href(&href)),
            vendor: first_text(card, PRODUCT_VENDOR),
            listed_price: first_text(card, PRODUCT_PRICE),
            images: first_image(card)
                .map(|src| vec![RawImage { src, alt: None }])
                .unwrap_or_default(),
            ..RawProduct::default()
        })
        .collect()
}

/// Extracts collection cards from the collections index page.
#[must_use]
pub fn parse_collection_cards(html: &str) -> Vec<RawCollection> {
    let doc = Html::parse_document(html);
    let Some(card_sel) = selector(COLLECTION_CARD) else {
        return Vec::new();
    };

    doc.select(&card_sel)
        .enumerate()
        .map(|(i, card)| RawCollection {
            id: Some(format!("html-collection-{i}")),
            title: first_text(card, COLLECTION_TITLE),
            handle: first_link(card).and_then(|href| handle_from_href(&href)),
            body_html: first_text(card, COLLECTION_DESCRIPTION),
            image: first_image(card),
            products_count: Some(0),
            ..RawCollection::default()
        })
        .collect()
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::error!(css, error = %e, "invalid selector");
            None
        }
    }
}

fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first descendant matching `css` that has any.
fn first_text(card: ElementRef<'_>, css: &str) -> Option<String> {
    let sel = selector(css)?;
    card.select(&sel)
        .map(|el| normalize_text(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

fn first_link(card: ElementRef<'_>) -> Option<String> {
    let sel = selector("a[href]")?;
    card.select(&sel)
        .find_map(|el| el.value().attr("href"))
        .map(|href| href.trim().to_owned())
}

fn first_image(card: ElementRef<'_>) -> Option<String> {
    let sel = selector("img")?;
    let img = card.select(&sel).next()?;
    let src = img
        .value()
        .attr("src")
        .or_else(|| img.value().attr("data-src"))?
        .trim();
    if src.is_empty() {
        return None;
    }
    Some(if src.starts_with("//") {
        format!("https:{src}")
    } else {
        src.to_owned()
    })
}

/// Last path segment of a link, without query or fragment.
fn handle_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
}
