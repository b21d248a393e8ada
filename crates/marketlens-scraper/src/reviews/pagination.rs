//! Pagination control discovery and page-turn verification.
//!
//! Controls are located in an HTML snapshot and replayed as a
//! [`ClickTarget`]. A turn only counts once the next snapshot shows the
//! controls still present and either the target page marked active or the
//! review feed content changed.

use std::fmt::Write as _;
use std::sync::LazyLock;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use sha2::{Digest, Sha256};

use crate::error::ScraperError;
use crate::reviews::parse::{REVIEW_CARD, REVIEW_TEXT};
use crate::session::{ClickTarget, PageSession};
use crate::text::element_text;

/// Numbered page buttons.
pub const PAGE_BUTTON: &str = "button[data-unf='pagination-item']";
/// The "next page" arrow, used when no numbered button for the next page exists.
pub const NEXT_BUTTON: &str = "button[aria-label*='selanjutnya']";

static PAGE_BUTTON_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(PAGE_BUTTON).expect("valid selector"));
static NEXT_BUTTON_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(NEXT_BUTTON).expect("valid selector"));
static FEED_TEXT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!("{REVIEW_CARD} {REVIEW_TEXT}")).expect("valid selector")
});

/// Outcome of a successful pagination step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The next page rendered and was verified.
    Moved,
    /// No enabled control leads past the current page.
    NoControl,
}

fn is_enabled(button: ElementRef<'_>) -> bool {
    let el = button.value();
    el.attr("disabled").is_none() && el.attr("aria-disabled") != Some("true")
}

fn is_active(button: ElementRef<'_>) -> bool {
    let el = button.value();
    el.attr("data-active") == Some("true") || el.attr("aria-current") == Some("page")
}

fn page_label(button: ElementRef<'_>) -> Option<u32> {
    element_text(button).parse().ok()
}

/// Finds the control that leads from `current_page` to the next page.
///
/// Prefers the numbered button labelled `current_page + 1` that is neither
/// disabled nor already active, then the "next" arrow.
#[must_use]
pub fn find_next_control(html: &str, current_page: u32) -> Option<ClickTarget> {
    let dom = Html::parse_document(html);
    let wanted = current_page.saturating_add(1);

    let numbered = dom.select(&PAGE_BUTTON_SELECTOR).position(|button| {
        is_enabled(button) && !is_active(button) && page_label(button) == Some(wanted)
    });
    if let Some(index) = numbered {
        return Some(ClickTarget::new(PAGE_BUTTON, index));
    }

    dom.select(&NEXT_BUTTON_SELECTOR)
        .position(is_enabled)
        .map(|index| ClickTarget::new(NEXT_BUTTON, index))
}

/// Page number of the button currently marked active.
#[must_use]
pub fn active_page(html: &str) -> Option<u32> {
    let dom = Html::parse_document(html);
    dom.select(&PAGE_BUTTON_SELECTOR)
        .find(|button| is_active(*button))
        .and_then(page_label)
}

#[must_use]
pub fn has_pagination(html: &str) -> bool {
    let dom = Html::parse_document(html);
    dom.select(&PAGE_BUTTON_SELECTOR).next().is_some()
        || dom.select(&NEXT_BUTTON_SELECTOR).next().is_some()
}

/// SHA-256 over the review texts in the feed, hex encoded.
///
/// Two snapshots of the same page hash equal; an empty feed hashes to the
/// digest of the empty string.
#[must_use]
pub fn content_fingerprint(html: &str) -> String {
    let dom = Html::parse_document(html);
    let mut hasher = Sha256::new();
    for text in dom.select(&FEED_TEXT_SELECTOR) {
        hasher.update(element_text(text).as_bytes());
        hasher.update([0u8]);
    }
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

fn has_turned(html: &str, target_page: u32, fingerprint_before: &str) -> bool {
    active_page(html) == Some(target_page) || content_fingerprint(html) != fingerprint_before
}

/// Clicks through to `current_page + 1` and verifies the turn.
///
/// Returns [`Advance::Moved`] without clicking when the current snapshot
/// already shows the target page, so a retry never skips a late render.
///
/// `fingerprint_before` is the [`content_fingerprint`] of the page being
/// left.
///
/// # Errors
///
/// - [`ScraperError::Navigation`] when the control detached before the click,
///   the controls vanished, or the page did not change.
/// - Session-level errors from the underlying [`PageSession`].
pub async fn advance_page(
    session: &dyn PageSession,
    current_page: u32,
    settle: Duration,
    fingerprint_before: &str,
) -> Result<Advance, ScraperError> {
    let target_page = current_page.saturating_add(1);
    let html = session.html().await?;
    // A click from an earlier attempt may have rendered late.
    if has_turned(&html, target_page, fingerprint_before) {
        tracing::debug!(target_page, "page already turned, not clicking again");
        return Ok(Advance::Moved);
    }
    let Some(target) = find_next_control(&html, current_page) else {
        return Ok(Advance::NoControl);
    };

    tracing::debug!(
        selector = %target.selector,
        index = target.index,
        target_page,
        "clicking pagination control"
    );
    if !session.click(&target).await? {
        return Err(ScraperError::Navigation {
            page: target_page,
            reason: "pagination control detached before click".to_owned(),
        });
    }
    tokio::time::sleep(settle).await;

    let after = session.html().await?;
    if !has_pagination(&after) {
        return Err(ScraperError::Navigation {
            page: target_page,
            reason: "pagination controls disappeared".to_owned(),
        });
    }
    if has_turned(&after, target_page, fingerprint_before) {
        Ok(Advance::Moved)
    } else {
        Err(ScraperError::Navigation {
            page: target_page,
            reason: "review feed unchanged after click".to_owned(),
        })
    }
}
