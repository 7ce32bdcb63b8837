//! Normalization from raw storefront records to the canonical
//! [`shopcat_core::Product`] and [`shopcat_core::Collection`] shapes.
//!
//! Every canonical field is filled: absent or empty upstream values take a
//! fixed default. Variants are carried over one-for-one and never invented.

use std::sync::LazyLock;

use regex::Regex;
use shopcat_core::{Collection, Product, ProductImage, Variant, DEFAULT_CURRENCY};

use crate::association::CollectionIndex;
use crate::types::{RawCollection, RawProduct, RawVariant};

static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static HYPHEN_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

const UNTITLED_PRODUCT: &str = "Untitled Product";
const UNTITLED_COLLECTION: &str = "Untitled Collection";
const UNKNOWN_VENDOR: &str = "Unknown";

/// Treats empty strings as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Normalizes a raw product at position `index` of its listing.
///
/// `memberships` is the reverse index built by
/// [`crate::association::map_collections`]; the product's entry (keyed by its
/// canonical id) becomes its `collections`. `fetched_at` fills
/// `published_at` when upstream omits it.
#[must_use]
pub fn normalize_product(
    raw: RawProduct,
    index: usize,
    origin: &str,
    memberships: &CollectionIndex,
    fetched_at: &str,
) -> Product {
    let id = present(raw.id).unwrap_or_else(|| format!("product-{index}"));
    let raw_title = present(raw.title);
    let handle = present(raw.handle)
        .unwrap_or_else(|| raw_title.as_deref().map(generate_handle).unwrap_or_default());
    let title = raw_title.unwrap_or_else(|| UNTITLED_PRODUCT.to_owned());

    let first_variant = raw.variants.first();
    let price = first_variant
        .and_then(|v| present(v.price.clone()))
        .or_else(|| present(raw.listed_price))
        .unwrap_or_else(|| "0".to_owned());
    let compare_at_price = first_variant.and_then(|v| present(v.compare_at_price.clone()));

    let variant_prefix = if handle.is_empty() {
        title.clone()
    } else {
        handle.clone()
    };
    let variants: Vec<Variant> = raw
        .variants
        .into_iter()
        .enumerate()
        .map(|(i, v)| normalize_variant(v, i, &variant_prefix))
        .collect();
    let available = variants.iter().any(|v| v.available);

    let url = format!(
        "{origin}/products/{}",
        if handle.is_empty() { &id } else { &handle }
    );
    let collections = memberships.get(&id).cloned().unwrap_or_default();

    Product {
        title,
        vendor: present(raw.vendor).unwrap_or_else(|| UNKNOWN_VENDOR.to_owned()),
        product_type: raw.product_type.unwrap_or_default(),
        price,
        compare_at_price,
        currency: DEFAULT_CURRENCY.to_owned(),
        images: raw
            .images
            .into_iter()
            .map(|img| ProductImage {
                src: img.src,
                alt: img.alt.unwrap_or_default(),
            })
            .collect(),
        description: raw.body_html.unwrap_or_default(),
        tags: raw.tags,
        collections,
        created_at: raw.created_at.unwrap_or_default(),
        updated_at: raw.updated_at.unwrap_or_default(),
        published_at: present(raw.published_at).unwrap_or_else(|| fetched_at.to_owned()),
        available,
        url,
        variants,
        id,
        handle,
    }
}

fn normalize_variant(raw: RawVariant, index: usize, prefix: &str) -> Variant {
    let raw_title = present(raw.title);
    let option1 = present(raw.option1);

    Variant {
        id: present(raw.id).unwrap_or_else(|| format!("{prefix}-variant-{index}")),
        title: raw_title
            .clone()
            .or_else(|| option1.clone())
            .unwrap_or_else(|| format!("Variant {}", index + 1)),
        option1: option1.or(raw_title).unwrap_or_default(),
        option1_name: present(raw.option1_name).unwrap_or_else(|| "Size".to_owned()),
        option2: raw.option2.unwrap_or_default(),
        option2_name: raw.option2_name.unwrap_or_default(),
        option3: raw.option3.unwrap_or_default(),
        option3_name: raw.option3_name.unwrap_or_default(),
        price: present(raw.price).unwrap_or_else(|| "0".to_owned()),
        compare_at_price: raw.compare_at_price.unwrap_or_default(),
        sku: raw.sku.unwrap_or_default(),
        barcode: raw.barcode.unwrap_or_default(),
        available: raw.available != Some(false),
        inventory_quantity: raw.inventory_quantity.unwrap_or(0),
        weight: raw.weight.unwrap_or(0.0),
        weight_unit: present(raw.weight_unit).unwrap_or_else(|| "kg".to_owned()),
        requires_shipping: raw.requires_shipping != Some(false),
        taxable: raw.taxable != Some(false),
        image: present(raw.image),
    }
}

/// Normalizes a raw collection at position `index` of its listing.
#[must_use]
pub fn normalize_collection(raw: RawCollection, index: usize, origin: &str) -> Collection {
    let id = present(raw.id).unwrap_or_else(|| format!("collection-{index}"));
    let handle = raw.handle.unwrap_or_default();
    let url = format!(
        "{origin}/collections/{}",
        if handle.is_empty() { &id } else { &handle }
    );

    Collection {
        title: present(raw.title).unwrap_or_else(|| UNTITLED_COLLECTION.to_owned()),
        description: raw.body_html.as_deref().map(strip_html).unwrap_or_default(),
        image: present(raw.image),
        products_count: raw.products_count.unwrap_or(0),
        published_at: raw.published_at.unwrap_or_default(),
        updated_at: raw.updated_at.unwrap_or_default(),
        url,
        id,
        handle,
    }
}

/// Derives a URL slug from a title.
///
/// Lowercases, drops everything except ASCII letters, digits, whitespace and
/// hyphens, turns whitespace runs into single hyphens, collapses repeated
/// hyphens, and trims hyphens from both ends.
///
/// `"Men's T-Shirt!! 2.0"` becomes `"mens-t-shirt-20"`.
#[must_use]
pub fn generate_handle(title: &str) -> String {
    let lower = title.to_lowercase();
    let kept = NON_SLUG_RE.replace_all(&lower, "");
    let hyphenated = WHITESPACE_RE.replace_all(&kept, "-");
    let collapsed = HYPHEN_RUN_RE.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_owned()
}

/// Removes markup tags and surrounding whitespace.
#[must_use]
pub fn strip_html(html: &str) -> String {
    TAG_RE.replace_all(html, "").trim().to_owned()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
