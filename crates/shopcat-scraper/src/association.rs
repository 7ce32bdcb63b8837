//! Product-to-collection reverse index.

use std::collections::HashMap;

use shopcat_core::{CollectionRef, ScrapeOptions};

use crate::client::ShopifyClient;
use crate::error::ScraperError;

/// Product id → the collections listing it, in collection enumeration order.
pub type CollectionIndex = HashMap<String, Vec<CollectionRef>>;

/// Builds the reverse index for every collection of the store at `origin`.
///
/// Fetches `/collections.json`, then every page of
/// `/collections/<handle>/products.json` for each collection in the order
/// returned, sleeping `collection_delay` between consecutive collections.
/// Membership pages are walked with the same rules as the product
/// pagination loop. A failed first membership page skips that collection
/// only. If the collection list itself cannot be fetched the index is empty,
/// which means "no association data", not "no memberships".
pub async fn map_collections(
    client: &ShopifyClient,
    origin: &str,
    options: &ScrapeOptions,
) -> CollectionIndex {
    let mut index = CollectionIndex::new();

    let list_url = format!("{origin}/collections.json");
    let collections = match client.fetch_collections(&list_url).await {
        Ok(collections) => collections,
        Err(e) => {
            tracing::warn!(
                origin,
                kind = ?e.kind(),
                error = %e,
                "collection list unavailable, skipping association mapping"
            );
            return index;
        }
    };
    tracing::info!(origin, count = collections.len(), "mapping collection memberships");

    let mut is_first_fetch = true;
    for collection in collections {
        let Some(handle) = collection.handle.filter(|h| !h.is_empty()) else {
            tracing::debug!(origin, id = ?collection.id, "collection without handle, skipping");
            continue;
        };

        if !is_first_fetch && !options.collection_delay.is_zero() {
            tokio::time::sleep(options.collection_delay).await;
        }
        is_first_fetch = false;

        let members_listing = format!("{origin}/collections/{handle}/products.json");
        let members = match client.fetch_all_pages(&members_listing, options).await {
            Ok(members) => members,
            Err(e) => {
                let e = ScraperError::CollectionMembership {
                    handle,
                    source: Box::new(e),
                };
                tracing::warn!(origin, kind = ?e.kind(), error = %e, "skipping collection");
                continue;
            }
        };

        let summary = CollectionRef {
            id: collection.id.unwrap_or_default(),
            title: collection.title.unwrap_or_default(),
            handle,
        };
        for product_id in members
            .into_iter()
            .filter_map(|p| p.id.filter(|id| !id.is_empty()))
        {
            let refs = index.entry(product_id).or_default();
            if !refs.iter().any(|r| r.handle == summary.handle) {
                refs.push(summary.clone());
            }
        }
    }

    tracing::info!(origin, products = index.len(), "mapped products to collections");
    index
}
