//! `scrape` command: acquire, serialize, write.

use anyhow::Context;
use shopcat_core::{export, ExportError, ExportFormat, ScrapeOptions};
use shopcat_scraper::{acquire, Acquisition, CatalogRecords, ShopifyClient};

use crate::ScrapeArgs;

/// Runs one acquisition and writes the serialized records to `args.output`
/// (or stdout). A one-line summary goes to stderr either way.
///
/// # Errors
///
/// Returns an error if the URL is invalid, serialization fails, or the
/// output file cannot be written. Upstream failures are not errors; they
/// produce an empty (or partial) result.
pub(crate) async fn run_scrape(
    client: &ShopifyClient,
    options: &ScrapeOptions,
    args: &ScrapeArgs,
) -> anyhow::Result<()> {
    let acquisition = acquire(
        client,
        &args.url,
        args.kind,
        args.page,
        args.limit,
        options,
    )
    .await?;

    eprintln!("{}", summary_line(&acquisition));

    let text = render(&acquisition, args.format)
        .with_context(|| format!("failed to serialize {} as {:?}", args.kind, args.format))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = text.len(), "export written");
        }
        None if text.is_empty() => {}
        None => println!("{text}"),
    }

    Ok(())
}

pub(crate) fn render(
    acquisition: &Acquisition,
    format: ExportFormat,
) -> Result<String, ExportError> {
    match &acquisition.records {
        CatalogRecords::Products(products) => export::export_products(products, format),
        CatalogRecords::Collections(collections) => {
            export::export_collections(collections, format)
        }
    }
}

pub(crate) fn summary_line(acquisition: &Acquisition) -> String {
    format!(
        "{} {} from {} (hasMore: {})",
        acquisition.total,
        acquisition.records.kind(),
        acquisition.store,
        acquisition.has_more
    )
}
