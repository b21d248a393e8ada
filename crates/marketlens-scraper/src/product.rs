//! Product detail page extraction.

use std::sync::LazyLock;
use std::time::Duration;

use marketlens_core::{AppConfig, ProductMetadata};
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::numbers::{parse_count, parse_rating};
use crate::session::{open_page, ClickTarget, PageSession};
use crate::strategy::FieldChain;
use crate::text::{element_text, non_empty, normalize_whitespace, spaced_text, text_with_breaks};

/// Present once the product page has rendered its heading.
pub const PRODUCT_READY_SELECTOR: &str = r#"h1[data-testid="lblPDPDetailProductName"], h1"#;

/// Button labels that expand a truncated description.
const EXPAND_LABELS: &[&str] = &["Lihat Selengkapnya", "Selengkapnya", "See More"];

const REVIEW_COUNT_MIN: u64 = 10;
const REVIEW_COUNT_MAX: u64 = 999_999;

static SHORT_DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d[.,]\d{1,2})\b").expect("valid regex"));
static LEADING_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\b").expect("valid regex"));
static ULASAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)*\s*(?:rb|ribu|k|jt|juta)?)\s+ulasan").expect("valid regex")
});
static BUTTON_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("button").expect("valid selector"));
static BREADCRUMB_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("valid selector"));

/// Logical product fields, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Title,
    Price,
    Rating,
    ReviewCount,
    ShopName,
    ImageUrl,
    Description,
    Category,
}

/// Value of a single extracted field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Rating(f32),
    Count(u64),
}

/// Timing knobs for product-page extraction.
#[derive(Debug, Clone)]
pub struct MetadataOptions {
    pub page_timeout: Duration,
    /// Pause after clicking "show more" before re-reading the DOM.
    pub expand_settle: Duration,
}

impl MetadataOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            expand_settle: Duration::from_secs(1),
        }
    }
}

/// Rendered product page and what was extracted from it.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub metadata: ProductMetadata,
    /// Final DOM, reused for seller-signal extraction.
    pub html: String,
    /// Whether the heading marker rendered before the timeout.
    pub ready: bool,
}

fn text_of(el: ElementRef<'_>) -> Option<String> {
    non_empty(element_text(el))
}

fn src_of(el: ElementRef<'_>) -> Option<String> {
    el.value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

fn description_of(el: ElementRef<'_>) -> Option<String> {
    non_empty(text_with_breaks(el))
}

/// Second-to-last breadcrumb segment, from `>`-separated text or from list
/// items when the separators are icons.
fn category_of(el: ElementRef<'_>) -> Option<String> {
    let text = el.text().collect::<String>();
    let parts: Vec<String> = text.split('>').map(normalize_whitespace).collect();
    if parts.len() >= 2 {
        return non_empty(parts[parts.len() - 2].clone());
    }
    let items: Vec<String> = el
        .select(&BREADCRUMB_ITEM_SELECTOR)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    if items.len() >= 2 {
        return Some(items[items.len() - 2].clone());
    }
    None
}

/// Rating widget text such as `"4.9"` or `"4,8 dari 5"`. Counter text like
/// `"(3.554 rating)"` is rejected: its three-digit fraction is a thousands group.
fn rating_of(el: ElementRef<'_>) -> Option<f32> {
    let text = spaced_text(el);
    if let Some(caps) = SHORT_DECIMAL_RE.captures(&text) {
        return parse_rating(&caps[1]);
    }
    LEADING_INT_RE
        .captures(&text)
        .and_then(|caps| caps[1].parse::<f32>().ok())
        .filter(|r| (1.0..=5.0).contains(r))
}

fn ulasan_count_of(el: ElementRef<'_>) -> Option<u64> {
    let text = spaced_text(el);
    ULASAN_RE.captures(&text).and_then(|caps| parse_count(&caps[1]))
}

fn rating_capture(caps: &Captures<'_>) -> Option<f32> {
    parse_rating(&caps[1])
}

fn plausible_count(caps: &Captures<'_>) -> Option<u64> {
    parse_count(&caps[1]).filter(|n| (REVIEW_COUNT_MIN..=REVIEW_COUNT_MAX).contains(n))
}

/// Selector chains for every product field.
pub struct ProductExtractor {
    title: FieldChain<String>,
    price: FieldChain<String>,
    rating: FieldChain<f32>,
    review_count: FieldChain<u64>,
    shop_name: FieldChain<String>,
    image_url: FieldChain<String>,
    description: FieldChain<String>,
    category: FieldChain<String>,
}

impl Default for ProductExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: FieldChain::new("title")
                .selector(r#"h1[data-testid="lblPDPDetailProductName"]"#, text_of)
                .selector("h1.css-1os9jjn", text_of)
                .selector(".prd_link-product-name", text_of)
                .selector("h1", text_of),
            price: FieldChain::new("price")
                .selector(r#"[data-testid="lblPDPDetailProductPrice"]"#, text_of)
                .selector(".price", text_of)
                .selector(".css-1ksb19c", text_of)
                .selector(".prd_link-prod-price", text_of),
            rating: FieldChain::new("rating")
                .selector(r#"[data-testid="lblPDPDetailProductRatingNumber"]"#, rating_of)
                .selector(r#"[data-testid="lblPDPDetailProductRatingCounter"]"#, rating_of)
                .selector(".prd_rating-average-text", rating_of)
                .selector(".css-153qjw7", rating_of)
                .selector(r#"[class*="rating"]"#, rating_of)
                .pattern(r"(?i)(\d[.,]\d{1,2})\s*(?:bintang|star|rating)", rating_capture)
                .pattern(r"(?i)rating[:\s]*(\d[.,]\d{1,2})\b", rating_capture)
                .pattern(r"(\d[.,]\d{1,2})\s*/\s*5\b", rating_capture),
            review_count: FieldChain::new("review_count")
                .selector("span, div, p, a", ulasan_count_of)
                .pattern(r"(?i)rating\s*•\s*(\d[\d.,]*)\s+ulasan", plausible_count)
                .pattern(
                    r"(?i)(\d[\d.,]*\s*(?:rb|ribu|k|jt|juta)?)\s*(?:ulasan|reviews?)\b",
                    plausible_count,
                )
                .pattern(r"(?i)\b(\d+)\b\D{0,40}ulasan", plausible_count),
            shop_name: FieldChain::new("shop_name")
                .selector(r#"[data-testid="lblPDPDetailMerchantName"]"#, text_of)
                .selector(".shop-name", text_of)
                .selector(".css-1kr2wmi", text_of)
                .selector(r#"[data-testid="llbPDPFooterShopName"] h2"#, text_of),
            image_url: FieldChain::new("image_url")
                .selector(r#"img[data-testid="PDPImageMain"]"#, src_of)
                .selector(".css-1c345mg img", src_of)
                .selector(".prd_media-content img", src_of),
            description: FieldChain::new("description")
                .selector(r#"[data-testid="lblPDPDescriptionProduk"]"#, description_of)
                .selector(".css-1k1relq", description_of)
                .selector(".prd_desc-content", description_of),
            category: FieldChain::new("category")
                .selector(r#"[data-testid="lblPDPCrumb"]"#, category_of)
                .selector(".css-l5njp4", category_of)
                .selector(".breadcrumb", category_of),
        }
    }

    /// Extracts one field. Absence is reported as `None`, never as an error.
    #[must_use]
    pub fn extract_field(&self, dom: &Html, field: ProductField) -> Option<FieldValue> {
        match field {
            ProductField::Title => self.title.extract(dom).map(FieldValue::Text),
            ProductField::Price => self.price.extract(dom).map(FieldValue::Text),
            ProductField::Rating => self.rating.extract(dom).map(FieldValue::Rating),
            ProductField::ReviewCount => self.review_count.extract(dom).map(FieldValue::Count),
            ProductField::ShopName => self.shop_name.extract(dom).map(FieldValue::Text),
            ProductField::ImageUrl => self.image_url.extract(dom).map(FieldValue::Text),
            ProductField::Description => self.description.extract(dom).map(FieldValue::Text),
            ProductField::Category => self.category.extract(dom).map(FieldValue::Text),
        }
    }

    /// Extracts every field independently; missing fields stay `None`.
    #[must_use]
    pub fn extract(&self, dom: &Html) -> ProductMetadata {
        ProductMetadata {
            title: self.title.extract(dom),
            price: self.price.extract(dom),
            average_rating: self.rating.extract(dom),
            total_review_count: self.review_count.extract(dom),
            shop_name: self.shop_name.extract(dom),
            image_url: self.image_url.extract(dom),
            description: self.description.extract(dom),
            category: self.category.extract(dom),
        }
    }

    #[must_use]
    pub fn extract_html(&self, html: &str) -> ProductMetadata {
        self.extract(&Html::parse_document(html))
    }

    /// Locates a "show more" control for the description, if one rendered.
    #[must_use]
    pub fn expand_target(&self, html: &str) -> Option<ClickTarget> {
        let dom = Html::parse_document(html);

        let see_more = r#"button[data-testid="btnPDPSeeMore"]"#;
        if has_match(&dom, see_more) {
            return Some(ClickTarget::new(see_more, 0));
        }

        let labelled = dom.select(&BUTTON_SELECTOR).position(|button| {
            let label = element_text(button);
            EXPAND_LABELS.iter().any(|l| label.contains(l))
        });
        if let Some(index) = labelled {
            return Some(ClickTarget::new("button", index));
        }

        let legacy = ".css-1nv6gtb";
        has_match(&dom, legacy).then(|| ClickTarget::new(legacy, 0))
    }
}

fn has_match(dom: &Html, css: &str) -> bool {
    Selector::parse(css)
        .map(|selector| dom.select(&selector).next().is_some())
        .unwrap_or(false)
}

/// Clicks the expansion control and waits for the DOM to settle.
///
/// Returns `Ok(false)` when the control vanished before the click.
async fn expand_description(
    session: &dyn PageSession,
    target: &ClickTarget,
    settle: Duration,
) -> Result<bool, ScraperError> {
    let clicked = session.click(target).await?;
    if clicked {
        tokio::time::sleep(settle).await;
    }
    Ok(clicked)
}

/// Loads a product page and extracts its metadata.
///
/// A heading that never renders is not fatal: extraction runs on whatever
/// loaded. The description expansion is best-effort.
///
/// # Errors
///
/// Returns [`ScraperError`] only for session-level failures (navigation or
/// DOM serialization).
pub async fn extract_product_metadata(
    session: &dyn PageSession,
    extractor: &ProductExtractor,
    url: &str,
    options: &MetadataOptions,
) -> Result<ProductPage, ScraperError> {
    tracing::info!(url, "loading product page");
    let ready = open_page(session, url, PRODUCT_READY_SELECTOR, options.page_timeout).await?;
    let mut html = session.html().await?;

    if let Some(target) = extractor.expand_target(&html) {
        match expand_description(session, &target, options.expand_settle).await {
            Ok(true) => {
                tracing::debug!(selector = %target.selector, index = target.index, "expanded description");
                html = session.html().await?;
            }
            Ok(false) => tracing::debug!(selector = %target.selector, "expansion control disappeared"),
            Err(e) => tracing::warn!(error = %e, "description expansion failed, using collapsed text"),
        }
    }

    let metadata = extractor.extract_html(&html);
    tracing::info!(
        url,
        ready,
        fields = metadata.populated_fields(),
        title = metadata.title.as_deref().unwrap_or(""),
        "product metadata extracted"
    );
    Ok(ProductPage {
        metadata,
        html,
        ready,
    })
}

#[cfg(test)]
#[path = "product_test.rs"]
mod tests;
