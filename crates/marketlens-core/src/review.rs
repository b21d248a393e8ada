//! Review records and the outcome of one paginated collection run.

use serde::{Deserialize, Serialize};

/// Where a review's star rating came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingSource {
    /// Read from the rendered star widget or its attributes.
    Page,
    /// Estimated from the review text by the keyword lexicon.
    Heuristic,
    /// No rating could be determined.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Trimmed, whitespace-normalized review body. Never empty.
    pub text: String,
    /// Star rating in `1..=5`.
    pub rating: Option<u8>,
    pub rating_source: RatingSource,
}

impl ReviewRecord {
    /// Builds a record from raw text, returning `None` when the text is blank.
    #[must_use]
    pub fn new(text: &str, rating: Option<u8>, rating_source: RatingSource) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let rating = rating.filter(|r| (1..=5).contains(r));
        let rating_source = if rating.is_none() {
            RatingSource::None
        } else {
            rating_source
        };
        Some(Self {
            text: text.to_string(),
            rating,
            rating_source,
        })
    }
}

/// Why the collector stopped walking pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Requested number of reviews collected.
    TargetReached,
    /// Hard page cap hit before the target.
    PageCap,
    /// Too many consecutive pages produced no new reviews.
    EmptyThreshold,
    /// No next-page control could be clicked and verified.
    PaginationEnd,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::TargetReached => write!(f, "target_reached"),
            Termination::PageCap => write!(f, "page_cap"),
            Termination::EmptyThreshold => write!(f, "empty_threshold"),
            Termination::PaginationEnd => write!(f, "pagination_end"),
        }
    }
}

/// Ordered, deduplicated reviews plus collection diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCollection {
    pub reviews: Vec<ReviewRecord>,
    pub pages_visited: u32,
    /// Consecutive pages without a new review at the moment collection stopped.
    pub consecutive_empty_pages: u32,
    pub termination: Termination,
}

impl ReviewCollection {
    #[must_use]
    pub fn rated_from_page(&self) -> usize {
        self.count_source(RatingSource::Page)
    }

    #[must_use]
    pub fn rated_heuristically(&self) -> usize {
        self.count_source(RatingSource::Heuristic)
    }

    #[must_use]
    pub fn unrated(&self) -> usize {
        self.count_source(RatingSource::None)
    }

    fn count_source(&self, source: RatingSource) -> usize {
        self.reviews
            .iter()
            .filter(|r| r.rating_source == source)
            .count()
    }
}
