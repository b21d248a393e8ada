//! Seller signals from the product page and, when linked, the shop page.
//!
//! Extraction never fails. Anything that cannot be read stays `None` and, when
//! the gap is worth surfacing, a note is appended to [`SellerSignals::notes`].

use std::sync::LazyLock;
use std::time::Duration;

use marketlens_core::{validate_product_url, AppConfig, Badge, SellerSignals};
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::numbers::{parse_count, parse_decimal, parse_percent};
use crate::session::{open_page, PageSession};
use crate::strategy::FieldChain;
use crate::text::{element_text, non_empty, visible_text};

pub const NOTE_PDP_METRICS_MISSING: &str = "Seller metrics not found in expected locations";
pub const NOTE_SHOP_URL_MISSING: &str = "Shop page link not found";
pub const NOTE_SHOP_PAGE_UNAVAILABLE: &str = "Shop page metrics unavailable";
pub const NOTE_SHOP_METRICS_MISSING: &str = "Shop page loaded but operational metrics were not found";

static SHOP_CONTAINER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[data-testid="llbPDPFooterShopName"]"#).expect("valid selector")
});
static OFFICIAL_BADGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[data-testid="pdpShopBadgeOS"]"#).expect("valid selector"));
static BADGE_IMAGES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"img[src*="power_merchant"], img[src*="badge"]"#).expect("valid selector")
});
static GRID_ROWS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[data-unify="grid"][class*="grid-row"]"#).expect("valid selector")
});
static STAR_ICON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"img[src*="action-star"]"#).expect("valid selector"));
static CLOCK_ICON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"img[src*="general-clock"]"#).expect("valid selector"));
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").expect("valid selector"));

static PARENTHESIZED_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*([\d.,]+\s*(?:rb|k|ribu|jt|juta)?)\s*\)").expect("valid regex")
});
static RATING_WITH_VOLUME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*\(\s*([\d.,]+\s*(?:rb|k|ribu|jt|juta)?)\s*\)")
        .expect("valid regex")
});
static PROCESSING_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)±\s*\d+\s*(?:menit|jam|hari)").expect("valid regex"));

/// Timing and scope for seller extraction.
#[derive(Debug, Clone)]
pub struct SellerOptions {
    pub page_timeout: Duration,
    /// Pause after the shop page's body appears, for lazy widgets.
    pub settle: Duration,
    /// The shop page must live on one of these domains.
    pub allowed_domains: Vec<String>,
}

impl SellerOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            settle: Duration::from_millis(config.pagination_settle_ms),
            allowed_domains: config.allowed_domains.clone(),
        }
    }
}

fn text_of(el: ElementRef<'_>) -> Option<String> {
    non_empty(element_text(el))
}

fn href_of(el: ElementRef<'_>) -> Option<String> {
    el.value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .map(str::to_string)
}

fn percent_capture(caps: &Captures<'_>) -> Option<f32> {
    parse_percent(&caps[1])
}

fn text_capture(caps: &Captures<'_>) -> Option<String> {
    non_empty(caps[1].trim().to_string())
}

/// Selector and pattern chains for seller fields.
pub struct SellerExtractor {
    seller_name: FieldChain<String>,
    shop_link: FieldChain<String>,
    location: FieldChain<String>,
    join_date: FieldChain<String>,
    chat_performance: FieldChain<f32>,
    on_time_shipping: FieldChain<f32>,
    cancellation_rate: FieldChain<f32>,
}

impl Default for SellerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SellerExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seller_name: FieldChain::new("seller_name")
                .selector(r#"[data-testid="llbPDPFooterShopName"] h2"#, text_of)
                .selector(r#"[data-testid="lblPDPDetailMerchantName"]"#, text_of)
                .selector(".shop-name", text_of)
                .selector(r#"[data-testid="shopNameHeader"]"#, text_of),
            shop_link: FieldChain::new("shop_link")
                .selector(r#"a[href*="/shop/"]"#, href_of)
                .selector(r#"a[href*="/seller/"]"#, href_of)
                .selector(r#"[data-testid*="shop"] a"#, href_of)
                .selector(r#"[data-testid*="seller"] a"#, href_of)
                .selector(r#"[data-testid="llbPDPFooterShopName"] a"#, href_of),
            location: FieldChain::new("location")
                .selector(r#"[data-testid="shopLocation"]"#, text_of)
                .selector(r#"[data-testid*="Location"]"#, text_of)
                .selector(r#"[data-testid*="location"]"#, text_of),
            join_date: FieldChain::new("join_date")
                .selector(r#"[data-testid="shopJoinDate"]"#, text_of)
                .pattern(
                    r"(?i)(?:buka sejak|bergabung sejak|bergabung|joined since|joined)\s*:?\s*([a-z]{3,9}\.?\s+\d{4})",
                    text_capture,
                ),
            chat_performance: FieldChain::new("chat_performance")
                .pattern(
                    r"(?i)(?:performa chat|chat dibalas|chat performance|balas chat)\D{0,40}?(\d{1,3}(?:[.,]\d+)?)\s*%",
                    percent_capture,
                )
                .pattern(
                    r"(?i)(\d{1,3}(?:[.,]\d+)?)\s*%\s*(?:chat dibalas|chat replied)",
                    percent_capture,
                ),
            on_time_shipping: FieldChain::new("on_time_shipping")
                .pattern(
                    r"(?i)(\d{1,3}(?:[.,]\d+)?)\s*%\s*(?:pesanan\s+)?(?:dikirim\s+)?(?:tepat waktu|on[- ]time)",
                    percent_capture,
                )
                .pattern(
                    r"(?i)(?:tepat waktu|on[- ]time shipping|pengiriman tepat)\D{0,40}?(\d{1,3}(?:[.,]\d+)?)\s*%",
                    percent_capture,
                ),
            cancellation_rate: FieldChain::new("cancellation_rate")
                .pattern(
                    r"(?i)(?:tingkat pembatalan|pembatalan|dibatalkan|cancellation rate)\D{0,40}?(\d{1,3}(?:[.,]\d+)?)\s*%",
                    percent_capture,
                )
                .pattern(
                    r"(?i)(\d{1,3}(?:[.,]\d+)?)\s*%\s*(?:pesanan\s+)?(?:dibatalkan|cancell?ed)",
                    percent_capture,
                ),
        }
    }

    /// Reads the seller block of a product page.
    #[must_use]
    pub fn extract_pdp(&self, html: &str) -> SellerSignals {
        let dom = Html::parse_document(html);
        let mut signals = SellerSignals {
            seller_name: self.seller_name.extract(&dom),
            location: self.location.extract(&dom),
            ..SellerSignals::default()
        };

        read_badges(&dom, &mut signals);
        read_grid_rows(&dom, &mut signals);

        if signals.store_rating.is_none() || signals.processing_time.is_none() {
            read_text_fallbacks(&visible_text(&dom), &mut signals);
        }

        if signals.store_rating.is_none() && signals.processing_time.is_none() {
            signals.note(NOTE_PDP_METRICS_MISSING);
        }

        tracing::debug!(
            seller = signals.seller_name.as_deref().unwrap_or(""),
            badges = signals.badges.len(),
            store_rating = ?signals.store_rating,
            review_volume = ?signals.review_volume,
            "product-page seller signals"
        );
        signals
    }

    /// Absolute shop-page URL linked from a product page, restricted to the
    /// allowed domains.
    #[must_use]
    pub fn shop_url(&self, html: &str, product_url: &Url, allowed_domains: &[String]) -> Option<Url> {
        let dom = Html::parse_document(html);
        let href = self.shop_link.extract(&dom)?;
        let resolved = product_url.join(&href).ok()?;
        match validate_product_url(resolved.as_str(), allowed_domains) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!(href, error = %e, "ignoring off-site shop link");
                None
            }
        }
    }

    /// Merges operational metrics from a shop page into `signals`. Returns
    /// whether any metric was found.
    pub fn apply_shop_page(&self, html: &str, signals: &mut SellerSignals) -> bool {
        let dom = Html::parse_document(html);
        let before = metric_count(signals);

        signals.chat_performance = signals.chat_performance.or_else(|| self.chat_performance.extract(&dom));
        signals.on_time_shipping = signals.on_time_shipping.or_else(|| self.on_time_shipping.extract(&dom));
        signals.cancellation_rate = signals.cancellation_rate.or_else(|| self.cancellation_rate.extract(&dom));
        if signals.join_date.is_none() {
            signals.join_date = self.join_date.extract(&dom);
        }
        if signals.location.is_none() {
            signals.location = self.location.extract(&dom);
        }
        if signals.seller_name.is_none() {
            signals.seller_name = self.seller_name.extract(&dom);
        }

        metric_count(signals) > before
    }
}

fn metric_count(signals: &SellerSignals) -> usize {
    [
        signals.chat_performance.is_some(),
        signals.on_time_shipping.is_some(),
        signals.cancellation_rate.is_some(),
        signals.join_date.is_some(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count()
}

fn read_badges(dom: &Html, signals: &mut SellerSignals) {
    let Some(container) = dom.select(&SHOP_CONTAINER).next() else {
        return;
    };

    if container.select(&OFFICIAL_BADGE).next().is_some() {
        signals.badges.insert(Badge::OfficialStore);
    }

    for img in container.select(&BADGE_IMAGES) {
        let src = img.value().attr("src").unwrap_or_default();
        let alt = img.value().attr("alt").unwrap_or_default().to_lowercase();
        if src.contains("power_merchant_pro") || alt.contains("pro") {
            signals.badges.insert(Badge::PowerMerchantPro);
        } else if src.contains("power_merchant") || alt.contains("merchant") {
            signals.badges.insert(Badge::PowerMerchant);
        }
    }
}

/// Credibility rows: a star icon row holds `"4.9"` and `"(6 rb)"` spans, a
/// clock icon row holds the processing time.
fn read_grid_rows(dom: &Html, signals: &mut SellerSignals) {
    for row in dom.select(&GRID_ROWS) {
        let Some(paragraph) = row.select(&PARAGRAPH).next() else {
            continue;
        };
        let spans: Vec<String> = paragraph.select(&SPAN).map(element_text).collect();

        if row.select(&STAR_ICON).next().is_some() {
            if let Some(rating) = spans
                .first()
                .and_then(|s| parse_decimal(s))
                .filter(|r| (0.0..=5.0).contains(r))
            {
                signals.store_rating = Some(rating);
            }
            if let Some(volume) = spans.get(1).and_then(|s| {
                PARENTHESIZED_COUNT_RE
                    .captures(s)
                    .and_then(|caps| parse_count(&caps[1]))
            }) {
                signals.review_volume = Some(volume);
            }
        }

        if row.select(&CLOCK_ICON).next().is_some() {
            if let Some(time) = spans.first().filter(|s| !s.is_empty()) {
                signals.processing_time = Some(time.clone());
            }
        }
    }
}

/// Whole-page patterns such as `"4.9 (6 rb)"` and `"± 55 menit"`.
fn read_text_fallbacks(text: &str, signals: &mut SellerSignals) {
    if signals.store_rating.is_none() {
        let found = RATING_WITH_VOLUME_RE.captures_iter(text).find_map(|caps| {
            let rating = parse_decimal(&caps[1]).filter(|r| (0.0..=5.0).contains(r))?;
            Some((rating, parse_count(&caps[2])))
        });
        if let Some((rating, volume)) = found {
            signals.store_rating = Some(rating);
            signals.review_volume = signals.review_volume.or(volume);
        }
    }

    if signals.processing_time.is_none() {
        signals.processing_time = PROCESSING_TIME_RE
            .find(text)
            .map(|m| m.as_str().to_string());
    }
}

/// Collects seller signals for a product: the product page's seller block,
/// then the linked shop page for operational metrics.
///
/// Never fails. A shop page that cannot be loaded only adds a note.
pub async fn extract_seller_signals(
    session: &dyn PageSession,
    extractor: &SellerExtractor,
    product_html: &str,
    product_url: &Url,
    options: &SellerOptions,
) -> SellerSignals {
    let mut signals = extractor.extract_pdp(product_html);

    let Some(shop_url) = extractor.shop_url(product_html, product_url, &options.allowed_domains) else {
        tracing::info!(url = %product_url, "no shop page link on product page");
        signals.note(NOTE_SHOP_URL_MISSING);
        return signals;
    };

    match load_shop_page(session, shop_url.as_str(), options).await {
        Ok(html) => {
            if !extractor.apply_shop_page(&html, &mut signals) {
                signals.note(NOTE_SHOP_METRICS_MISSING);
            }
        }
        Err(e) => {
            tracing::warn!(url = %shop_url, error = %e, "could not load shop page");
            signals.note(NOTE_SHOP_PAGE_UNAVAILABLE);
        }
    }

    tracing::info!(
        url = %product_url,
        seller = signals.seller_name.as_deref().unwrap_or(""),
        notes = signals.notes.len(),
        "seller signals extracted"
    );
    signals
}

async fn load_shop_page(
    session: &dyn PageSession,
    url: &str,
    options: &SellerOptions,
) -> Result<String, crate::error::ScraperError> {
    tracing::info!(url, "loading shop page");
    open_page(session, url, "body", options.page_timeout).await?;
    tokio::time::sleep(options.settle).await;
    session.html().await
}

#[cfg(test)]
#[path = "seller_test.rs"]
mod tests;
