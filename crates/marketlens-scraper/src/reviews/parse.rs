//! Review card parsing for one rendered review-listing page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::text::{element_text, spaced_text};

/// The review feed; present even when the page holds no reviews.
pub const REVIEW_FEED: &str = "section#review-feed";
/// One review card in the feed.
pub const REVIEW_CARD: &str = "section#review-feed article";
/// Review body inside a card.
pub const REVIEW_TEXT: &str = "span[data-testid='lblItemUlasan']";

/// Star widgets, most specific first.
const RATING_WIDGETS: &[&str] = &[
    "div[data-testid='icnStarRating']",
    ".shopee-rating",
    "[class*='star']",
];
/// Attributes that carry a numeric rating on the widget itself.
const RATING_ATTRIBUTES: &[&str] = &["data-rating", "data-value", "aria-label"];

static CARD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(REVIEW_CARD).expect("valid selector"));
static TEXT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(REVIEW_TEXT).expect("valid selector"));
static WIDGET_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    RATING_WIDGETS
        .iter()
        .map(|css| Selector::parse(css).expect("valid selector"))
        .collect()
});
static FILLED_STAR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class*="filled"], [class*="active"], [style*="fill"]"#)
        .expect("valid selector")
});
static DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)").expect("valid regex"));
static TEXT_RATING_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(\d)\s*(?:stars?|bintang)\b",
        r"(?i)rating[:\s]*(\d)\b",
        r"\b(\d)\s*/\s*5\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// A review card before deduplication and rating-source tagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReview {
    pub text: String,
    /// Stars read from the page, always within `1..=5`.
    pub rating: Option<u8>,
}

/// Parses every review card on a rendered page, in document order.
///
/// Cards without a text node, or whose text is blank, are skipped.
#[must_use]
pub fn parse_review_page(html: &str) -> Vec<RawReview> {
    let dom = Html::parse_document(html);
    dom.select(&CARD_SELECTOR)
        .filter_map(parse_card)
        .collect()
}

fn parse_card(card: ElementRef<'_>) -> Option<RawReview> {
    let text = card.select(&TEXT_SELECTOR).next().map(element_text)?;
    if text.is_empty() {
        return None;
    }
    let rating = widget_rating(card).or_else(|| text_rating(card));
    Some(RawReview { text, rating })
}

/// Reads the star widget: filled-star count first, then rating attributes.
/// Falls through to the next widget selector when one yields nothing usable.
fn widget_rating(card: ElementRef<'_>) -> Option<u8> {
    WIDGET_SELECTORS.iter().find_map(|selector| {
        let widget = card.select(selector).next()?;
        filled_stars(widget).or_else(|| attribute_rating(widget))
    })
}

fn filled_stars(widget: ElementRef<'_>) -> Option<u8> {
    let filled = widget.select(&FILLED_STAR_SELECTOR).count();
    u8::try_from(filled).ok().filter(|n| (1..=5).contains(n))
}

fn attribute_rating(widget: ElementRef<'_>) -> Option<u8> {
    RATING_ATTRIBUTES.iter().find_map(|attr| {
        let raw = widget.value().attr(attr)?;
        let caps = DIGIT_RE.captures(raw)?;
        let value: f32 = caps[1].replace(',', ".").parse().ok()?;
        star_value(value)
    })
}

/// Scans the card's text for phrases such as "5 bintang" or "4/5".
fn text_rating(card: ElementRef<'_>) -> Option<u8> {
    let text = spaced_text(card);
    TEXT_RATING_RES.iter().find_map(|re| {
        let caps = re.captures(&text)?;
        caps[1].parse::<u8>().ok().filter(|n| (1..=5).contains(n))
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn star_value(value: f32) -> Option<u8> {
    if (1.0..=5.0).contains(&value) {
        Some(value.trunc() as u8)
    } else {
        None
    }
}
