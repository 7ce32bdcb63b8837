//! Serialization of canonical records into downloadable text.
//!
//! Two modes: a flat delimited table (the 47-column bulk-import layout for
//! products, a key-derived table for collections) and pretty-printed JSON.
//! Every function here is pure. Empty input yields an empty string.

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::records::{Collection, Product, Variant};

/// Column order of the storefront bulk-import spreadsheet.
pub const BULK_IMPORT_HEADERS: [&str; 47] = [
    "Handle",
    "Title",
    "Body (HTML)",
    "Vendor",
    "Type",
    "Tags",
    "Published",
    "Option1 Name",
    "Option1 Value",
    "Option2 Name",
    "Option2 Value",
    "Option3 Name",
    "Option3 Value",
    "Variant SKU",
    "Variant Grams",
    "Variant Inventory Tracker",
    "Variant Inventory Policy",
    "Variant Fulfillment Service",
    "Variant Price",
    "Variant Compare At Price",
    "Variant Requires Shipping",
    "Variant Taxable",
    "Variant Barcode",
    "Image Src",
    "Image Position",
    "Image Alt Text",
    "Gift Card",
    "SEO Title",
    "SEO Description",
    "Google Shopping / Google Product Category",
    "Google Shopping / Gender",
    "Google Shopping / Age Group",
    "Google Shopping / MPN",
    "Google Shopping / AdWords Grouping",
    "Google Shopping / AdWords Labels",
    "Google Shopping / Condition",
    "Google Shopping / Custom Product",
    "Google Shopping / Custom Label 0",
    "Google Shopping / Custom Label 1",
    "Google Shopping / Custom Label 2",
    "Google Shopping / Custom Label 3",
    "Google Shopping / Custom Label 4",
    "Variant Image",
    "Variant Weight Unit",
    "Variant Tax Code",
    "Cost per item",
    "Status",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer flush failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("record {index} is not an object")]
    NotAnObject { index: usize },

    #[error("unknown export format \"{0}\"")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Serializes products in the requested format.
///
/// # Errors
///
/// Returns [`ExportError`] if the underlying writer fails.
pub fn export_products(products: &[Product], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => products_to_bulk_csv(products),
        ExportFormat::Json => to_pretty_json(products),
    }
}

/// Serializes collections in the requested format.
///
/// # Errors
///
/// Returns [`ExportError`] if the underlying writer fails.
pub fn export_collections(
    collections: &[Collection],
    format: ExportFormat,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => records_to_table_csv(collections),
        ExportFormat::Json => to_pretty_json(collections),
    }
}

/// Renders products in the 47-column bulk-import layout.
///
/// One row per variant; shared product columns are filled only on the first
/// variant's row. A product without variants yields a single row carrying the
/// product columns and variant defaults.
///
/// # Errors
///
/// Returns [`ExportError`] if the CSV writer fails.
pub fn products_to_bulk_csv(products: &[Product]) -> Result<String, ExportError> {
    if products.is_empty() {
        return Ok(String::new());
    }

    let mut writer = quoted_writer();
    writer.write_record(BULK_IMPORT_HEADERS)?;

    for product in products {
        if product.variants.is_empty() {
            writer.write_record(bulk_row(product, None, true))?;
            continue;
        }
        for (index, variant) in product.variants.iter().enumerate() {
            writer.write_record(bulk_row(product, Some(variant), index == 0))?;
        }
    }

    finish(writer)
}

/// Renders arbitrary records as a table whose header is the union of their
/// keys in first-seen order.
///
/// Nested objects and arrays become compact JSON text; `null` becomes an
/// empty cell.
///
/// # Errors
///
/// Returns [`ExportError::NotAnObject`] if a record does not serialize to a
/// JSON object, or another variant if serialization or writing fails.
pub fn records_to_table_csv<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| match serde_json::to_value(record)? {
            Value::Object(map) => Ok(map),
            _ => Err(ExportError::NotAnObject { index }),
        })
        .collect::<Result<Vec<Map<String, Value>>, ExportError>>()?;

    let mut headers: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut writer = quoted_writer();
    writer.write_record(&headers)?;
    for row in &rows {
        writer.write_record(headers.iter().map(|h| cell_text(row.get(*h))))?;
    }

    finish(writer)
}

/// Pretty-prints records as a JSON array with two-space indentation.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_pretty_json<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_json::to_string_pretty(records)?)
}

fn quoted_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

/// Flushes the writer and returns its text without the trailing terminator.
fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    }
}

/// Renders a weight without a trailing `.0` for whole numbers.
fn grams_cell(weight: f64) -> String {
    format!("{weight}")
}

fn bulk_row(product: &Product, variant: Option<&Variant>, first: bool) -> Vec<String> {
    let shared = |value: &str| {
        if first {
            value.to_string()
        } else {
            String::new()
        }
    };
    let first_image_src = product
        .first_image()
        .map(|i| i.src.clone())
        .unwrap_or_default();
    let first_image_alt = product
        .first_image()
        .map(|i| i.alt.clone())
        .unwrap_or_default();
    let product_price = if product.price.is_empty() {
        "0".to_string()
    } else {
        product.price.clone()
    };
    let product_compare_at = product.compare_at_price.clone().unwrap_or_default();

    let mut row = Vec::with_capacity(BULK_IMPORT_HEADERS.len());
    row.push(if product.handle.is_empty() {
        product.id.clone()
    } else {
        product.handle.clone()
    });
    row.push(shared(&product.title));
    row.push(shared(&product.description));
    row.push(shared(&product.vendor));
    row.push(shared(&product.product_type));
    row.push(shared(&product.tags.join(",")));
    row.push(shared(&product.published_at));

    match variant {
        Some(v) => {
            row.extend([
                v.option1_name.clone(),
                v.option1.clone(),
                v.option2_name.clone(),
                v.option2.clone(),
                v.option3_name.clone(),
                v.option3.clone(),
                v.sku.clone(),
                grams_cell(v.weight),
                String::new(),
                "deny".to_string(),
                "manual".to_string(),
                if v.price.is_empty() {
                    product_price
                } else {
                    v.price.clone()
                },
                if v.compare_at_price.is_empty() {
                    product_compare_at
                } else {
                    v.compare_at_price.clone()
                },
                v.requires_shipping.to_string(),
                v.taxable.to_string(),
                v.barcode.clone(),
            ]);
        }
        None => {
            row.extend(std::iter::repeat_n(String::new(), 7));
            row.extend([
                "0".to_string(),
                String::new(),
                "deny".to_string(),
                "manual".to_string(),
                product_price,
                product_compare_at,
                "true".to_string(),
                "true".to_string(),
                String::new(),
            ]);
        }
    }

    row.push(shared(&first_image_src));
    row.push(shared("1"));
    row.push(shared(&first_image_alt));
    row.push("false".to_string());
    // SEO and Google Shopping columns are always blank.
    row.extend(std::iter::repeat_n(String::new(), 15));
    row.push(
        variant
            .and_then(|v| v.image.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or(first_image_src),
    );
    row.extend(std::iter::repeat_n(String::new(), 3));
    row.push("active".to_string());
    row
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
