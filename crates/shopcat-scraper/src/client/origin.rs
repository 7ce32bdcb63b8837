//! Storefront address normalization.

use crate::error::ScraperError;

/// Reduces a storefront address to its `scheme://host[:port]` origin.
///
/// Given `"https://shop.example.com/collections/all?page=2"`, returns
/// `"https://shop.example.com"`. Every upstream path is built from this
/// origin, so the caller may paste any page of the store.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidInput`] if `input` does not parse as an
/// absolute URL or uses a scheme other than `http`/`https`.
pub fn normalize_store_url(input: &str) -> Result<String, ScraperError> {
    let trimmed = input.trim();
    let url = reqwest::Url::parse(trimmed).map_err(|e| ScraperError::InvalidInput {
        input: input.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidInput {
            input: input.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ScraperError::InvalidInput {
            input: input.to_owned(),
            reason: "missing host".to_owned(),
        });
    }

    Ok(url.origin().ascii_serialization())
}

/// Extracts the hostname from a URL for use in error messages.
///
/// Falls back to the full URL string if parsing fails.
pub(super) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
