//! Scripted in-memory browser session for collector tests.
//!
//! Renders a fixed list of review pages as Tokopedia-shaped HTML with
//! numbered pagination buttons. Clicking a pagination control switches the
//! rendered page the way the live site does.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use marketlens_scraper::reviews::pagination::{NEXT_BUTTON, PAGE_BUTTON};
use marketlens_scraper::{ClickTarget, CollectorConfig, PageSession, ScraperError};
use scraper::{Html, Selector};

/// One review card.
#[derive(Debug, Clone)]
pub struct Card {
    pub text: Option<String>,
    pub stars: Option<u8>,
}

impl Card {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            stars: None,
        }
    }

    /// A card with only photos, which yields no review text.
    pub fn photo_only() -> Self {
        Self {
            text: None,
            stars: Some(5),
        }
    }

    pub fn stars(mut self, stars: u8) -> Self {
        self.stars = Some(stars);
        self
    }

    fn render(&self) -> String {
        let mut out = String::from("<article>");
        if let Some(stars) = self.stars {
            out.push_str(r#"<div data-testid="icnStarRating">"#);
            for i in 0..5 {
                if i < stars {
                    out.push_str(r#"<span class="star filled"></span>"#);
                } else {
                    out.push_str(r#"<span class="star"></span>"#);
                }
            }
            out.push_str("</div>");
        }
        if let Some(text) = &self.text {
            out.push_str(&format!(r#"<span data-testid="lblItemUlasan">{text}</span>"#));
        }
        out.push_str("</article>");
        out
    }
}

/// `count` rated cards with texts unique to `page`.
pub fn unique_page(page: usize, count: usize) -> Vec<Card> {
    (1..=count)
        .map(|i| Card::text(&format!("ulasan {i} dari halaman {page}")).stars(5))
        .collect()
}

#[derive(Debug, Default)]
struct State {
    current: usize,
    navigations: Vec<String>,
    clicks: usize,
    html_calls: usize,
    /// Page a late click will switch to after the next snapshot.
    pending: Option<usize>,
}

pub struct ScriptedSession {
    pages: Vec<Vec<Card>>,
    /// Clicks are accepted but the page never changes.
    stuck: bool,
    /// Clicks take effect one `html()` snapshot after they land.
    late_clicks: bool,
    /// Pages render without the review feed section.
    without_feed: bool,
    /// `html()` fails with a session error from this call onwards (1-based).
    fail_html_from: Option<usize>,
    state: Mutex<State>,
}

impl ScriptedSession {
    pub fn new(pages: Vec<Vec<Card>>) -> Self {
        Self {
            pages,
            stuck: false,
            late_clicks: false,
            without_feed: false,
            fail_html_from: None,
            state: Mutex::new(State::default()),
        }
    }

    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    pub fn late_clicks(mut self) -> Self {
        self.late_clicks = true;
        self
    }

    pub fn without_feed(mut self) -> Self {
        self.without_feed = true;
        self
    }

    pub fn fail_html_from(mut self, call: usize) -> Self {
        self.fail_html_from = Some(call);
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn clicks(&self) -> usize {
        self.state.lock().unwrap().clicks
    }

    fn render(&self, current: usize) -> String {
        let cards: String = self.pages[current].iter().map(Card::render).collect();
        let mut nav = String::new();
        for label in 1..=self.pages.len() {
            let active = if label == current + 1 {
                r#" data-active="true""#
            } else {
                ""
            };
            nav.push_str(&format!(
                r#"<button data-unf="pagination-item"{active}>{label}</button>"#
            ));
        }
        let disabled = if current + 1 >= self.pages.len() {
            " disabled"
        } else {
            ""
        };
        nav.push_str(&format!(
            r#"<button aria-label="Laman selanjutnya"{disabled}>&gt;</button>"#
        ));
        if self.without_feed {
            format!(r#"<html><body><div class="skeleton">{cards}</div><nav>{nav}</nav></body></html>"#)
        } else {
            format!(
                r#"<html><body><section id="review-feed">{cards}</section><nav>{nav}</nav></body></html>"#
            )
        }
    }
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_owned());
        state.current = 0;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool, ScraperError> {
        if self.pages.is_empty() {
            return Ok(false);
        }
        let current = self.state.lock().unwrap().current;
        let selector = Selector::parse(selector).unwrap();
        let dom = Html::parse_document(&self.render(current));
        Ok(dom.select(&selector).next().is_some())
    }

    async fn html(&self) -> Result<String, ScraperError> {
        let mut state = self.state.lock().unwrap();
        state.html_calls += 1;
        if self.fail_html_from.is_some_and(|from| state.html_calls >= from) {
            return Err(ScraperError::Session("target closed".to_owned()));
        }
        let html = self.render(state.current);
        if let Some(next) = state.pending.take() {
            state.current = next;
        }
        Ok(html)
    }

    async fn scroll_to_bottom(&self) -> Result<(), ScraperError> {
        Ok(())
    }

    async fn click(&self, target: &ClickTarget) -> Result<bool, ScraperError> {
        let mut state = self.state.lock().unwrap();
        state.clicks += 1;
        let next = if target.selector == PAGE_BUTTON {
            target.index
        } else if target.selector == NEXT_BUTTON {
            state.current + 1
        } else {
            return Ok(false);
        };
        if next >= self.pages.len() {
            return Ok(false);
        }
        if self.stuck {
            return Ok(true);
        }
        if self.late_clicks {
            state.pending = Some(next);
        } else {
            state.current = next;
        }
        Ok(true)
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        Ok(())
    }
}

/// Collector settings with every delay zeroed.
pub fn instant_config(max_reviews: usize) -> CollectorConfig {
    CollectorConfig {
        max_reviews,
        max_pages: 8,
        max_consecutive_empty: 2,
        page_timeout: Duration::from_millis(10),
        settle_delay: Duration::ZERO,
        scroll_settle: Duration::ZERO,
        pagination_settle: Duration::ZERO,
        pagination_retries: 1,
        heuristic_ratings: false,
    }
}
