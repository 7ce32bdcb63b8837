//! Canonical catalog records.
//!
//! Every field is always present once a record has been normalized: absent
//! upstream values are replaced by deterministic defaults, never omitted.
//! Records are built fresh for each acquisition call and never mutated
//! afterwards.

use serde::{Deserialize, Serialize};

/// Storefronts expose no per-product currency on their public listings.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A storefront product in canonical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Upstream ID as a string, or `product-<index>` when upstream omits it.
    pub id: String,
    pub title: String,
    /// URL slug, e.g. `"mens-t-shirt-20"`.
    pub handle: String,
    pub vendor: String,
    pub product_type: String,
    /// Price of the first variant, `"0"` when there are no variants.
    pub price: String,
    /// Compare-at price of the first variant; `None` when absent.
    pub compare_at_price: Option<String>,
    pub currency: String,
    pub images: Vec<ProductImage>,
    /// Raw HTML body, possibly empty.
    pub description: String,
    pub tags: Vec<String>,
    /// Collections that list this product, in enumeration order.
    pub collections: Vec<CollectionRef>,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: String,
    pub available: bool,
    pub url: String,
    /// Exactly the upstream variants. Empty stays empty.
    pub variants: Vec<Variant>,
}

impl Product {
    #[must_use]
    pub fn first_image(&self) -> Option<&ProductImage> {
        self.images.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub src: String,
    pub alt: String,
}

/// Summary of a collection a product belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    pub id: String,
    pub title: String,
    pub handle: String,
}

/// A single purchasable variant of a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub title: String,
    pub option1: String,
    pub option1_name: String,
    pub option2: String,
    pub option2_name: String,
    pub option3: String,
    pub option3_name: String,
    pub price: String,
    /// Empty string when absent (unlike [`Product::compare_at_price`]).
    pub compare_at_price: String,
    pub sku: String,
    pub barcode: String,
    pub available: bool,
    pub inventory_quantity: i64,
    pub weight: f64,
    pub weight_unit: String,
    pub requires_shipping: bool,
    pub taxable: bool,
    /// Variant image URL, if any.
    pub image: Option<String>,
}

/// A storefront collection in canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Upstream ID as a string, or `collection-<index>` when upstream omits it.
    pub id: String,
    pub title: String,
    pub handle: String,
    /// Plain text; markup is stripped during normalization.
    pub description: String,
    pub image: Option<String>,
    pub products_count: u64,
    pub published_at: String,
    pub updated_at: String,
    pub url: String,
}
