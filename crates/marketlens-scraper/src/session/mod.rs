//! Browser page sessions.
//!
//! A [`PageSession`] is one exclusively owned browser tab. Extraction code is
//! written against the trait so the collector can be driven by Chromium in
//! production and by scripted in-memory pages in tests.

pub mod chromium;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;

pub use chromium::ChromiumSessionFactory;

/// An element to click, addressed as the `index`-th match of `selector` in
/// document order.
///
/// Targets are resolved against a parsed HTML snapshot and replayed in the
/// live page, so `index` follows the same ordering as
/// `document.querySelectorAll`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickTarget {
    pub selector: String,
    pub index: usize,
}

impl ClickTarget {
    #[must_use]
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
        }
    }
}

/// One browser tab owned by a single extraction run.
///
/// A session is never handed to two runs at once.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate to `url`. A slow load is not an error; readiness is checked
    /// separately with [`wait_for_selector`](Self::wait_for_selector).
    async fn navigate(&self, url: &str) -> Result<(), ScraperError>;

    /// Waits until `selector` matches or `timeout` elapses. Returns whether
    /// the selector appeared.
    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScraperError>;

    /// Serialized DOM of the current document.
    async fn html(&self) -> Result<String, ScraperError>;

    async fn scroll_to_bottom(&self) -> Result<(), ScraperError>;

    /// Scrolls `target` into view and clicks it. Returns `false` when the
    /// target no longer exists.
    async fn click(&self, target: &ClickTarget) -> Result<bool, ScraperError>;

    async fn close(self: Box<Self>) -> Result<(), ScraperError>;
}

/// Creates fresh sessions. Sessions are never shared between runs.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageSession>, ScraperError>;
}

/// Navigates and waits for `ready_selector`.
///
/// Returns `Ok(false)` when the marker never appeared; callers decide whether
/// to continue with the partially rendered page.
///
/// # Errors
///
/// Propagates session-level failures from navigation or polling.
pub async fn open_page(
    session: &dyn PageSession,
    url: &str,
    ready_selector: &str,
    timeout: Duration,
) -> Result<bool, ScraperError> {
    session.navigate(url).await?;
    let ready = session.wait_for_selector(ready_selector, timeout).await?;
    if !ready {
        tracing::warn!(
            url,
            selector = ready_selector,
            timeout_secs = timeout.as_secs(),
            "ready marker did not appear, continuing with partial page"
        );
    }
    Ok(ready)
}

/// Closes `session`, logging instead of propagating a failed teardown.
pub async fn close_quietly(session: Box<dyn PageSession>) {
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }
}
