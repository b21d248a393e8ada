//! Prioritized extraction strategies.
//!
//! Each logical field owns a [`FieldChain`]: an ordered list of strategies,
//! most stable selector first and most generic last. The first strategy that
//! yields a value wins; results from different strategies are never merged.

use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};

use crate::text::visible_text;

/// One way of locating a field in a rendered document.
pub trait Strategy<T>: Send + Sync {
    /// Human-readable identity used in logs (the CSS selector or regex).
    fn describe(&self) -> &str;

    fn try_extract(&self, dom: &Html) -> Option<T>;
}

/// Matches a CSS selector and parses matching elements in document order.
pub struct SelectorStrategy<T> {
    css: &'static str,
    selector: Selector,
    parse: fn(ElementRef<'_>) -> Option<T>,
}

impl<T> SelectorStrategy<T> {
    /// # Panics
    ///
    /// Panics if `css` is not a valid selector. Selectors are compile-time
    /// constants, so this is a programming error.
    #[must_use]
    pub fn new(css: &'static str, parse: fn(ElementRef<'_>) -> Option<T>) -> Self {
        Self {
            css,
            selector: Selector::parse(css).expect("valid selector"),
            parse,
        }
    }
}

impl<T> Strategy<T> for SelectorStrategy<T> {
    fn describe(&self) -> &str {
        self.css
    }

    fn try_extract(&self, dom: &Html) -> Option<T> {
        dom.select(&self.selector).find_map(self.parse)
    }
}

/// Scans the page's visible text with a regex; the parser doubles as the
/// plausibility check.
pub struct PatternStrategy<T> {
    pattern: Regex,
    parse: fn(&Captures<'_>) -> Option<T>,
}

impl<T> PatternStrategy<T> {
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex.
    #[must_use]
    pub fn new(pattern: &str, parse: fn(&Captures<'_>) -> Option<T>) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid regex"),
            parse,
        }
    }
}

impl<T> Strategy<T> for PatternStrategy<T> {
    fn describe(&self) -> &str {
        self.pattern.as_str()
    }

    fn try_extract(&self, dom: &Html) -> Option<T> {
        let text = visible_text(dom);
        self.pattern
            .captures_iter(&text)
            .find_map(|caps| (self.parse)(&caps))
    }
}

/// Ordered strategies for one field.
pub struct FieldChain<T> {
    field: &'static str,
    strategies: Vec<Box<dyn Strategy<T>>>,
}

impl<T: 'static> FieldChain<T> {
    #[must_use]
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    #[must_use]
    pub fn selector(self, css: &'static str, parse: fn(ElementRef<'_>) -> Option<T>) -> Self {
        self.then(SelectorStrategy::new(css, parse))
    }

    #[must_use]
    pub fn pattern(self, pattern: &str, parse: fn(&Captures<'_>) -> Option<T>) -> Self {
        self.then(PatternStrategy::new(pattern, parse))
    }

    #[must_use]
    pub fn then(mut self, strategy: impl Strategy<T> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// First value any strategy yields, or `None` when all miss.
    #[must_use]
    pub fn extract(&self, dom: &Html) -> Option<T> {
        self.extract_ranked(dom).map(|(_, value)| value)
    }

    /// Like [`extract`](Self::extract) but also reports the zero-based
    /// priority of the winning strategy.
    #[must_use]
    pub fn extract_ranked(&self, dom: &Html) -> Option<(usize, T)> {
        for (priority, strategy) in self.strategies.iter().enumerate() {
            if let Some(value) = strategy.try_extract(dom) {
                tracing::debug!(
                    field = self.field,
                    priority,
                    strategy = strategy.describe(),
                    "field extracted"
                );
                return Some((priority, value));
            }
        }
        tracing::debug!(field = self.field, tried = self.strategies.len(), "field absent");
        None
    }
}
