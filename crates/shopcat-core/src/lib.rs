//! Canonical storefront catalog records, export serializers, and runtime
//! configuration shared by the scraper, server, and CLI crates.

mod app_config;
mod config;
pub mod export;
pub mod records;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, ScrapeOptions};
pub use config::{load_app_config, load_app_config_from_env};
pub use export::{ExportError, ExportFormat};
pub use records::{
    Collection, CollectionRef, Product, ProductImage, Variant, DEFAULT_CURRENCY,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
