//! Paginated review collection.
//!
//! Walks the review listing one page at a time, deduplicating by review text,
//! until the target count, the page cap, or the empty-page threshold is hit,
//! or until there is no next page to turn to.

pub mod pagination;
pub mod parse;

use std::collections::HashSet;
use std::time::Duration;

use marketlens_core::{
    review_page_url, AppConfig, RatingSource, ReviewCollection, ReviewRecord, Termination,
};
use url::Url;

use crate::error::ScraperError;
use crate::heuristic::estimate_rating;
use crate::retry::{is_retriable, retry_with_backoff};
use crate::session::PageSession;

use self::pagination::{advance_page, content_fingerprint, Advance};
use self::parse::{parse_review_page, RawReview, REVIEW_FEED};

/// Limits and timings for one collection run.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub max_reviews: usize,
    pub max_pages: u32,
    pub max_consecutive_empty: u32,
    pub page_timeout: Duration,
    /// Pause before reading each page; also the base delay between
    /// pagination retries.
    pub settle_delay: Duration,
    /// Pause after scrolling so lazy-loaded cards render.
    pub scroll_settle: Duration,
    /// Pause after clicking a pagination control.
    pub pagination_settle: Duration,
    pub pagination_retries: u32,
    pub heuristic_ratings: bool,
}

impl CollectorConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_reviews: config.max_reviews,
            max_pages: config.max_pages,
            max_consecutive_empty: config.max_consecutive_empty,
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            scroll_settle: Duration::from_secs(1),
            pagination_settle: Duration::from_millis(config.pagination_settle_ms),
            pagination_retries: config.pagination_retries,
            heuristic_ratings: config.heuristic_ratings,
        }
    }

    #[must_use]
    pub fn with_max_reviews(mut self, max_reviews: usize) -> Self {
        self.max_reviews = max_reviews;
        self
    }
}

/// Ordered, deduplicated reviews gathered so far.
#[derive(Debug, Default)]
struct Collected {
    seen: HashSet<String>,
    reviews: Vec<ReviewRecord>,
}

impl Collected {
    /// Adds unseen reviews from one page and returns how many were new.
    fn absorb(&mut self, page: Vec<RawReview>, heuristic_ratings: bool) -> usize {
        let before = self.reviews.len();
        for raw in page {
            let (rating, source) = match raw.rating {
                Some(stars) => (Some(stars), RatingSource::Page),
                None if heuristic_ratings => (Some(estimate_rating(&raw.text)), RatingSource::Heuristic),
                None => (None, RatingSource::None),
            };
            let Some(record) = ReviewRecord::new(&raw.text, rating, source) else {
                continue;
            };
            if self.seen.insert(record.text.clone()) {
                self.reviews.push(record);
            }
        }
        self.reviews.len() - before
    }
}

/// Collects up to `config.max_reviews` reviews for the product at
/// `product_url`.
///
/// The review listing URL is derived with [`review_page_url`]. Pagination
/// failures end the run with [`Termination::PaginationEnd`]; they are not
/// errors.
///
/// # Errors
///
/// - [`ScraperError::PageLoad`] if the review feed never renders on the first
///   page.
/// - Session-level failures ([`ScraperError::Browser`],
///   [`ScraperError::Session`]) at any point. Reviews collected before the
///   failure are discarded.
pub async fn collect_reviews(
    session: &dyn PageSession,
    product_url: &Url,
    config: &CollectorConfig,
) -> Result<ReviewCollection, ScraperError> {
    if config.max_reviews == 0 {
        return Ok(ReviewCollection {
            reviews: Vec::new(),
            pages_visited: 0,
            consecutive_empty_pages: 0,
            termination: Termination::TargetReached,
        });
    }

    let review_url = review_page_url(product_url);
    tracing::info!(url = %review_url, max_reviews = config.max_reviews, "collecting reviews");
    session.navigate(&review_url).await?;
    if !session
        .wait_for_selector(REVIEW_FEED, config.page_timeout)
        .await?
    {
        return Err(ScraperError::PageLoad {
            url: review_url,
            selector: REVIEW_FEED.to_owned(),
            timeout_secs: config.page_timeout.as_secs(),
        });
    }

    let mut collected = Collected::default();
    let mut page = 1u32;
    let mut consecutive_empty = 0u32;

    let termination = loop {
        match walk_page(session, page, &mut collected, config).await {
            Ok((added, html)) => {
                if added == 0 {
                    consecutive_empty += 1;
                } else {
                    consecutive_empty = 0;
                }

                if collected.reviews.len() >= config.max_reviews {
                    break Termination::TargetReached;
                }
                if page >= config.max_pages {
                    break Termination::PageCap;
                }
                if consecutive_empty >= config.max_consecutive_empty {
                    break Termination::EmptyThreshold;
                }

                let before = content_fingerprint(&html);
                let before = before.as_str();
                let turned = retry_with_backoff(config.pagination_retries, config.settle_delay, || {
                    advance_page(session, page, config.pagination_settle, before)
                })
                .await;
                match turned {
                    Ok(Advance::Moved) => page += 1,
                    Ok(Advance::NoControl) => {
                        tracing::info!(page, "no next-page control, end of reviews");
                        break Termination::PaginationEnd;
                    }
                    Err(e) if is_retriable(&e) => {
                        tracing::info!(page, error = %e, "pagination stalled, treating as end of reviews");
                        break Termination::PaginationEnd;
                    }
                    Err(e) => {
                        tracing::warn!(page, discarded = collected.reviews.len(), error = %e, "session failed during pagination");
                        return Err(e);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(page, discarded = collected.reviews.len(), error = %e, "session failed while reading review page");
                return Err(e);
            }
        }
    };

    let mut reviews = collected.reviews;
    reviews.truncate(config.max_reviews);
    let result = ReviewCollection {
        reviews,
        pages_visited: page,
        consecutive_empty_pages: consecutive_empty,
        termination,
    };
    tracing::info!(
        url = %review_url,
        collected = result.reviews.len(),
        pages_visited = result.pages_visited,
        rated_from_page = result.rated_from_page(),
        rated_heuristically = result.rated_heuristically(),
        unrated = result.unrated(),
        termination = %result.termination,
        "review collection finished"
    );
    Ok(result)
}

/// Reads one review page into `collected`. Returns the number of new reviews
/// and the HTML snapshot they were parsed from.
async fn walk_page(
    session: &dyn PageSession,
    page: u32,
    collected: &mut Collected,
    config: &CollectorConfig,
) -> Result<(usize, String), ScraperError> {
    if !session
        .wait_for_selector(REVIEW_FEED, config.page_timeout)
        .await?
    {
        tracing::debug!(page, "review feed missing, reading page anyway");
    }
    tokio::time::sleep(config.settle_delay).await;

    match session.scroll_to_bottom().await {
        Ok(()) => tokio::time::sleep(config.scroll_settle).await,
        Err(e) if is_retriable(&e) => tracing::debug!(page, error = %e, "scroll failed"),
        Err(e) => return Err(e),
    }

    let html = session.html().await?;
    let parsed = parse_review_page(&html);
    let on_page = parsed.len();
    let added = collected.absorb(parsed, config.heuristic_ratings);
    tracing::debug!(page, on_page, added, total = collected.reviews.len(), "review page read");
    Ok((added, html))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str, rating: Option<u8>) -> RawReview {
        RawReview {
            text: text.to_owned(),
            rating,
        }
    }

    #[test]
    fn absorb_deduplicates_by_text() {
        let mut collected = Collected::default();
        let added = collected.absorb(vec![raw("bagus", Some(5)), raw("bagus", Some(4))], false);
        assert_eq!(added, 1);
        let added = collected.absorb(vec![raw("bagus", Some(5)), raw("oke", None)], false);
        assert_eq!(added, 1);
        assert_eq!(collected.reviews.len(), 2);
        assert_eq!(collected.reviews[0].rating, Some(5));
    }

    #[test]
    fn absorb_tags_rating_sources() {
        let mut collected = Collected::default();
        collected.absorb(vec![raw("dari halaman", Some(4)), raw("mantap bagus puas", None)], true);
        assert_eq!(collected.reviews[0].rating_source, RatingSource::Page);
        assert_eq!(collected.reviews[1].rating_source, RatingSource::Heuristic);
        assert_eq!(collected.reviews[1].rating, Some(5));
    }

    #[test]
    fn absorb_leaves_missing_ratings_empty_without_heuristic() {
        let mut collected = Collected::default();
        collected.absorb(vec![raw("mantap", None)], false);
        assert_eq!(collected.reviews[0].rating, None);
        assert_eq!(collected.reviews[0].rating_source, RatingSource::None);
    }

    #[test]
    fn config_reads_app_config() {
        let app = AppConfig {
            env: marketlens_core::Environment::Test,
            log_level: "debug".to_owned(),
            allowed_domains: vec!["tokopedia.com".to_owned()],
            chrome_path: None,
            user_agent: "test".to_owned(),
            max_reviews: 50,
            max_pages: 8,
            max_consecutive_empty: 2,
            page_timeout_secs: 15,
            session_lifetime_secs: 300,
            settle_delay_ms: 2000,
            pagination_settle_ms: 3000,
            pagination_retries: 1,
            reputation_cache_ttl_secs: 86_400,
            heuristic_ratings: true,
        };
        let config = CollectorConfig::from_app_config(&app).with_max_reviews(10);
        assert_eq!(config.max_reviews, 10);
        assert_eq!(config.max_pages, 8);
        assert_eq!(config.pagination_settle, Duration::from_secs(3));
        assert!(config.heuristic_ratings);
    }
}
