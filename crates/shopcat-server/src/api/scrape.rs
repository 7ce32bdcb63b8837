//! Acquisition handlers: scrape an arbitrary storefront URL, or a
//! `*.myshopify.com` store by its subdomain.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use shopcat_scraper::{acquire, Acquisition, ErrorKind, RecordKind};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, PaginationMeta, ResponseMeta};

/// Limit applied when the caller does not send one: effectively "everything".
pub(super) const DEFAULT_LIMIT: usize = 999_999;
const DEFAULT_PAGE: u32 = 1;

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeRequest {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StoreQuery {
    pub page: Option<u32>,
    pub limit: Option<usize>,
}

/// `POST /api/scraper/scrape`
pub(super) async fn scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Acquisition>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            rejection.body_text(),
        )
    })?;

    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "validation_error", "URL is required"))?;

    let kind = parse_kind(&req_id.0, request.kind.as_deref())?;
    run_acquisition(&state, req_id, url, kind, request.page, request.limit).await
}

/// `GET /api/scraper/products/{store_id}`
pub(super) async fn store_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<String>,
    Query(query): Query<StoreQuery>,
) -> Result<Json<ApiResponse<Acquisition>>, ApiError> {
    let url = store_url(&req_id.0, &store_id)?;
    run_acquisition(
        &state,
        req_id,
        &url,
        RecordKind::Products,
        query.page,
        query.limit,
    )
    .await
}

/// `GET /api/scraper/collections/{store_id}`
pub(super) async fn store_collections(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<String>,
    Query(query): Query<StoreQuery>,
) -> Result<Json<ApiResponse<Acquisition>>, ApiError> {
    let url = store_url(&req_id.0, &store_id)?;
    run_acquisition(
        &state,
        req_id,
        &url,
        RecordKind::Collections,
        query.page,
        query.limit,
    )
    .await
}

async fn run_acquisition(
    state: &AppState,
    req_id: RequestId,
    url: &str,
    kind: RecordKind,
    page: Option<u32>,
    limit: Option<usize>,
) -> Result<Json<ApiResponse<Acquisition>>, ApiError> {
    let page = page.unwrap_or(DEFAULT_PAGE);
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if page == 0 {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "page must be at least 1",
        ));
    }
    if limit == 0 {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "limit must be at least 1",
        ));
    }

    tracing::info!(request_id = %req_id.0, url, %kind, page, limit, "scrape requested");
    let acquisition = acquire(&state.client, url, kind, page, limit, &state.options)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidInput => {
                tracing::debug!(request_id = %req_id.0, error = %e, "rejected store url");
                ApiError::new(req_id.0.clone(), "validation_error", "Invalid URL format")
            }
            _ => {
                tracing::error!(request_id = %req_id.0, error = %e, "acquisition failed");
                ApiError::new(req_id.0.clone(), "internal_error", "Failed to scrape store")
            }
        })?;

    let pagination = PaginationMeta {
        page,
        limit,
        total: acquisition.total,
        has_more: acquisition.has_more,
    };
    Ok(Json(ApiResponse {
        data: acquisition,
        meta: ResponseMeta::new(req_id.0).with_pagination(pagination),
    }))
}

fn parse_kind(req_id: &str, kind: Option<&str>) -> Result<RecordKind, ApiError> {
    let Some(kind) = kind else {
        return Ok(RecordKind::Products);
    };
    kind.parse().map_err(|_| {
        ApiError::new(
            req_id,
            "validation_error",
            format!("type must be 'products' or 'collections', got '{kind}'"),
        )
    })
}

/// Builds the storefront address for a `*.myshopify.com` subdomain.
///
/// Only ASCII alphanumerics and `-` are accepted, so the id can never change
/// the host the request goes to.
pub(super) fn store_url(req_id: &str, store_id: &str) -> Result<String, ApiError> {
    let valid = !store_id.is_empty()
        && store_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("invalid store id '{store_id}'"),
        ));
    }
    Ok(format!("https://{store_id}.myshopify.com"))
}

#[cfg(test)]
#[path = "scrape_test.rs"]
mod tests;
