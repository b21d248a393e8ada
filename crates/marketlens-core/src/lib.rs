//! Shared configuration and domain types for the marketlens workspace.
//!
//! Everything the scraper, the reputation scorer and the CLI exchange lives
//! here: product metadata, review records, seller signals, and the product URL
//! helpers that derive review-listing URLs and seller identities.

pub mod app_config;
pub mod config;
pub mod product;
pub mod product_url;
pub mod review;
pub mod seller;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use product::ProductMetadata;
pub use product_url::{review_page_url, seller_cache_key, validate_product_url, UrlError};
pub use review::{RatingSource, ReviewCollection, ReviewRecord, Termination};
pub use seller::{Badge, SellerSignals};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
