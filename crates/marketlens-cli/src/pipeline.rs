//! One extraction run per product URL: metadata, reviews and seller
//! reputation, gathered in a single exclusively owned browser session.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use marketlens_core::{
    review_page_url, seller_cache_key, validate_product_url, AppConfig, ProductMetadata,
    ReviewCollection, SellerSignals,
};
use marketlens_reputation::{score_seller, ReputationCache, ReputationScore};
use marketlens_scraper::seller::NOTE_SHOP_PAGE_UNAVAILABLE;
use marketlens_scraper::{
    close_quietly, collect_reviews, extract_product_metadata, extract_seller_signals,
    CollectorConfig, MetadataOptions, PageSession, ProductExtractor, ScraperError,
    SellerExtractor, SellerOptions, SessionFactory,
};
use serde::Serialize;
use tokio::time::{timeout_at, Instant};
use url::Url;
use uuid::Uuid;

/// Everything extracted for one product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductReport {
    pub run_id: Uuid,
    pub product_url: String,
    pub review_url: String,
    pub extracted_at: DateTime<Utc>,
    pub metadata: ProductMetadata,
    pub reviews: ReviewCollection,
    /// `None` when the reputation was served from the cache.
    pub seller: Option<SellerSignals>,
    pub reputation: ReputationScore,
    pub reputation_cached: bool,
}

struct Reputation {
    seller: Option<SellerSignals>,
    score: ReputationScore,
    cached: bool,
}

/// Composition root: owns the session factory, the extractors and the
/// reputation cache.
pub struct Pipeline {
    config: AppConfig,
    factory: Arc<dyn SessionFactory>,
    cache: ReputationCache,
    products: ProductExtractor,
    sellers: SellerExtractor,
}

impl Pipeline {
    pub fn new(config: AppConfig, factory: Arc<dyn SessionFactory>) -> Self {
        let cache = ReputationCache::new(Duration::from_secs(config.reputation_cache_ttl_secs));
        Self {
            config,
            factory,
            cache,
            products: ProductExtractor::new(),
            sellers: SellerExtractor::new(),
        }
    }

    /// Runs the full extraction for `raw_url`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] before any browser work when the URL is
    ///   malformed or off the allowed domains.
    /// - [`ScraperError::PageLoad`] when the review feed never renders.
    /// - [`ScraperError::SessionTimeout`] when the session outlives
    ///   `session_lifetime_secs`.
    /// - Any session-level failure. The session is closed on every path.
    pub async fn analyze(&self, raw_url: &str, max_reviews: usize) -> Result<ProductReport, ScraperError> {
        let url = validate_product_url(raw_url, &self.config.allowed_domains)?;
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, url = %url, max_reviews, "starting product analysis");

        let deadline = self.deadline();
        let session = self.bounded(deadline, self.factory.open()).await?;
        let outcome = self
            .bounded(deadline, self.run_analysis(session.as_ref(), &url, max_reviews))
            .await;
        close_quietly(session).await;

        let (metadata, reviews, reputation) = match outcome {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!(%run_id, url = %url, error = %e, "product analysis failed");
                return Err(e);
            }
        };

        tracing::info!(
            %run_id,
            reviews = reviews.reviews.len(),
            reliability = reputation.score.reliability_score,
            reputation_cached = reputation.cached,
            "product analysis complete"
        );
        Ok(ProductReport {
            run_id,
            product_url: url.to_string(),
            review_url: review_page_url(&url),
            extracted_at: Utc::now(),
            metadata,
            reviews,
            seller: reputation.seller,
            reputation: reputation.score,
            reputation_cached: reputation.cached,
        })
    }

    /// Collects reviews only.
    ///
    /// # Errors
    ///
    /// Same as [`Pipeline::analyze`].
    pub async fn reviews(&self, raw_url: &str, max_reviews: usize) -> Result<ReviewCollection, ScraperError> {
        let url = validate_product_url(raw_url, &self.config.allowed_domains)?;
        let collector = CollectorConfig::from_app_config(&self.config).with_max_reviews(max_reviews);

        let deadline = self.deadline();
        let session = self.bounded(deadline, self.factory.open()).await?;
        let outcome = self
            .bounded(deadline, collect_reviews(session.as_ref(), &url, &collector))
            .await;
        close_quietly(session).await;
        outcome
    }

    fn deadline(&self) -> Instant {
        Instant::now() + Duration::from_secs(self.config.session_lifetime_secs)
    }

    /// Runs `work` unless the session deadline passes first.
    async fn bounded<T>(
        &self,
        deadline: Instant,
        work: impl Future<Output = Result<T, ScraperError>>,
    ) -> Result<T, ScraperError> {
        timeout_at(deadline, work).await.unwrap_or_else(|_| {
            tracing::warn!(
                limit_secs = self.config.session_lifetime_secs,
                "session lifetime exceeded"
            );
            Err(ScraperError::SessionTimeout {
                limit_secs: self.config.session_lifetime_secs,
            })
        })
    }

    async fn run_analysis(
        &self,
        session: &dyn PageSession,
        url: &Url,
        max_reviews: usize,
    ) -> Result<(ProductMetadata, ReviewCollection, Reputation), ScraperError> {
        let options = MetadataOptions::from_app_config(&self.config);
        let page = extract_product_metadata(session, &self.products, url.as_str(), &options).await?;

        let collector = CollectorConfig::from_app_config(&self.config).with_max_reviews(max_reviews);
        let reviews = collect_reviews(session, url, &collector).await?;

        let reputation = self.reputation(session, url, &page.html).await;
        Ok((page.metadata, reviews, reputation))
    }

    /// Scores the seller, reusing a fresh cached score when one exists.
    ///
    /// Extraction gaps never fail the run: the scorer falls back to neutral
    /// values and the gaps are listed in the signals' notes. Scores built
    /// while the shop page was unreachable are not cached.
    async fn reputation(&self, session: &dyn PageSession, url: &Url, product_html: &str) -> Reputation {
        let key = seller_cache_key(url);
        if let Some(score) = self.cache.get(&key).await {
            tracing::info!(seller_key = %key, "using cached seller reputation");
            return Reputation {
                seller: None,
                score,
                cached: true,
            };
        }

        let options = SellerOptions::from_app_config(&self.config);
        let signals = extract_seller_signals(session, &self.sellers, product_html, url, &options).await;
        let score = score_seller(&signals);

        if signals.notes.iter().any(|n| n == NOTE_SHOP_PAGE_UNAVAILABLE) {
            tracing::info!(seller_key = %key, "shop page unavailable, reputation not cached");
        } else {
            self.cache.insert(&key, score.clone()).await;
        }
        Reputation {
            seller: Some(signals),
            score,
            cached: false,
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
