//! Raw storefront records as they arrive from the public JSON endpoints.
//!
//! ## Observed shape
//!
//! Storefront themes and apps rewrite these payloads often enough that no
//! field can be trusted to have one type:
//!
//! - `id` is a JSON number on most stores but a string on some proxies.
//! - `price` / `compare_at_price` are decimal strings (`"30.00"`) but appear as
//!   numbers on a few stores; `compare_at_price` is `null` when not on sale.
//! - `tags` is an array of strings on `products.json`, but some older stores
//!   still return the legacy comma-separated string.
//! - `images` entries are objects with `src`/`alt`; some feeds inline bare URL
//!   strings instead.
//! - A variant's `image` is either a URL string or an image object.
//!
//! Every field is therefore optional and parsed through a lenient helper that
//! maps anything unusable to `None` rather than failing the whole listing.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ScraperError;

/// A single product from `products.json` (or an HTML listing card).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub handle: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vendor: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_type: Option<String>,
    /// Raw HTML product description.
    #[serde(default, deserialize_with = "lenient_string")]
    pub body_html: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_images")]
    pub images: Vec<RawImage>,
    #[serde(default, deserialize_with = "lenient_variants")]
    pub variants: Vec<RawVariant>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub published_at: Option<String>,
    /// Price text scraped from an HTML listing card. Never set from JSON.
    #[serde(skip)]
    pub listed_price: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVariant {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub option1: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub option1_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub option2: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub option2_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub option3: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub option3_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub compare_at_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub barcode: Option<String>,
    /// Only an explicit `false` marks a variant unavailable.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub available: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub inventory_quantity: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub weight_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub requires_shipping: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub taxable: Option<bool>,
    #[serde(default, deserialize_with = "lenient_image_src")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub src: String,
    pub alt: Option<String>,
}

/// A single collection from `collections.json` (or an HTML collection card).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCollection {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub handle: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub body_html: Option<String>,
    #[serde(default, deserialize_with = "lenient_image_src")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub products_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,
}

/// Extracts the array under `field` from a JSON response body.
///
/// Elements that are not JSON objects, or that fail to deserialize, are
/// skipped with a warning so one bad record cannot sink a whole page.
///
/// # Errors
///
/// - [`ScraperError::Deserialize`] if the body is not JSON or `field` is not
///   an array.
/// - [`ScraperError::MissingField`] if `field` is absent or `null`.
pub(crate) fn records_from_body<T: DeserializeOwned>(
    body: &str,
    field: &str,
    context: &str,
) -> Result<Vec<T>, ScraperError> {
    let mut value: Value =
        serde_json::from_str(body).map_err(|e| ScraperError::Deserialize {
            context: context.to_owned(),
            source: e,
        })?;

    let items = match value.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => {
            return Err(ScraperError::MissingField {
                context: context.to_owned(),
                field: field.to_owned(),
            })
        }
        Some(Value::Array(items)) => items,
        Some(other) => {
            let source = serde_json::from_value::<Vec<Value>>(other)
                .err()
                .unwrap_or_else(|| serde::de::Error::custom("expected an array"));
            return Err(ScraperError::Deserialize {
                context: context.to_owned(),
                source,
            });
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(context, index, "skipping non-object {field} entry");
            continue;
        }
        match serde_json::from_value::<T>(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(context, index, error = %e, "skipping unreadable {field} entry");
            }
        }
    }
    Ok(records)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(|v| scalar_to_string(&v)))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Bool(b)) => Some(b),
        _ => None,
    })
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let tags: Vec<String> = match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(joined)) => joined.split(',').map(str::to_owned).collect(),
        _ => Vec::new(),
    };
    Ok(tags
        .into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect())
}

fn image_src(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("src").and_then(scalar_to_string),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}

fn lenient_image_src<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(|v| image_src(&v)))
}

fn lenient_images<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RawImage>, D::Error> {
    let Some(Value::Array(items)) = Option::<Value>::deserialize(d)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| {
            let src = image_src(item)?;
            let alt = item.get("alt").and_then(scalar_to_string);
            Some(RawImage { src, alt })
        })
        .collect())
}

fn lenient_variants<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RawVariant>, D::Error> {
    let Some(Value::Array(items)) = Option::<Value>::deserialize(d)? else {
        return Ok(Vec::new());
    };
    let mut variants = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(index, "skipping non-object variant entry");
            continue;
        }
        match serde_json::from_value::<RawVariant>(item) {
            Ok(variant) => variants.push(variant),
            Err(e) => tracing::warn!(index, error = %e, "skipping unreadable variant entry"),
        }
    }
    Ok(variants)
}
