mod scrape;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shopcat_core::ExportFormat;
use shopcat_scraper::{RecordKind, ShopifyClient};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopcat-cli")]
#[command(about = "Scrape public storefront catalogs and export them as CSV or JSON")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Acquire a store's products or collections and write them out
    Scrape(ScrapeArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ScrapeArgs {
    /// Any page of the storefront; only its origin is used
    url: String,

    /// Record type to acquire: `products` or `collections`
    #[arg(long = "type", default_value = "products")]
    kind: RecordKind,

    /// Output format: `csv` (bulk-import layout for products) or `json`
    #[arg(long, default_value = "csv")]
    format: ExportFormat,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Collections page to request (ignored for products)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,

    /// Maximum number of records to keep
    #[arg(long, default_value_t = 999_999)]
    limit: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shopcat_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries the export, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scrape(args)) => {
            let client = ShopifyClient::from_config(&config)
                .map_err(|e| anyhow::anyhow!("failed to build storefront client: {e}"))?;
            scrape::run_scrape(&client, &config.scrape_options(), &args).await?;
        }
        None => println!("shopcat-cli: run `shopcat-cli scrape <url>` or `--help`"),
    }

    Ok(())
}
