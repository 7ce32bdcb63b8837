//! Storefront catalog acquisition: URL normalization, the structured-listing
//! strategy chain with its pagination loop, HTML fallback extraction,
//! collection membership mapping, and normalization into canonical records.

pub mod acquire;
pub mod association;
pub mod client;
pub mod error;
pub mod html;
pub mod normalize;
mod rate_limit;
pub mod types;

pub use acquire::{
    acquire, acquire_collections, acquire_products, Acquisition, CatalogRecords, ProductStrategy,
    RecordKind,
};
pub use association::{map_collections, CollectionIndex};
pub use client::{normalize_store_url, ShopifyClient};
pub use error::{ErrorKind, ScraperError};
pub use normalize::{generate_handle, normalize_collection, normalize_product};
