//! Browser-driven extraction of product metadata, reviews and seller signals
//! from marketplace product pages.

pub mod error;
pub mod heuristic;
pub mod numbers;
pub mod product;
mod retry;
pub mod reviews;
pub mod seller;
pub mod session;
pub mod strategy;
pub mod text;

pub use error::ScraperError;
pub use heuristic::estimate_rating;
pub use product::{extract_product_metadata, MetadataOptions, ProductExtractor, ProductPage};
pub use reviews::{collect_reviews, CollectorConfig};
pub use seller::{extract_seller_signals, SellerExtractor, SellerOptions};
pub use session::{close_quietly, ChromiumSessionFactory, ClickTarget, PageSession, SessionFactory};
pub use strategy::{FieldChain, Strategy};
