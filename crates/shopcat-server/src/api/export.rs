//! `POST /api/scraper/export`: renders previously acquired records as a
//! downloadable CSV or JSON file.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use shopcat_core::{export, ExportError, ExportFormat, Product};
use shopcat_scraper::RecordKind;

use crate::middleware::RequestId;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub(super) struct ExportRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub format: Option<String>,
    #[serde(default)]
    pub records: Vec<Value>,
}

pub(super) async fn export(
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            rejection.body_text(),
        )
    })?;

    let kind = match request.kind.as_deref() {
        None => RecordKind::Products,
        Some(kind) => kind.parse().map_err(|_| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                format!("type must be 'products' or 'collections', got '{kind}'"),
            )
        })?,
    };
    let format: ExportFormat = request
        .format
        .as_deref()
        .unwrap_or("csv")
        .parse()
        .map_err(|e: ExportError| {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        })?;

    let count = request.records.len();
    let body = render(kind, format, request.records).map_err(|e| match e {
        ExportError::NotAnObject { .. } | ExportError::Json(_) => {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        }
        other => {
            tracing::error!(request_id = %req_id.0, error = %other, "export failed");
            ApiError::new(req_id.0.clone(), "internal_error", "export failed")
        }
    })?;

    let filename = export_filename(kind, format, Utc::now().timestamp_millis());
    tracing::info!(request_id = %req_id.0, %kind, count, %filename, "export rendered");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Products go through the typed bulk-import layout; collections are
/// rendered as-is so any object shape exports without loss.
fn render(
    kind: RecordKind,
    format: ExportFormat,
    records: Vec<Value>,
) -> Result<String, ExportError> {
    match kind {
        RecordKind::Products => {
            let products: Vec<Product> = serde_json::from_value(Value::Array(records))?;
            export::export_products(&products, format)
        }
        RecordKind::Collections => match format {
            ExportFormat::Csv => export::records_to_table_csv(&records),
            ExportFormat::Json => export::to_pretty_json(&records),
        },
    }
}

pub(super) fn export_filename(kind: RecordKind, format: ExportFormat, millis: i64) -> String {
    format!("shopify-all-{kind}-{millis}.{}", format.extension())
}
