//! Text helpers for rendered DOM fragments.

use scraper::{ElementRef, Html, Node};

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Block-level elements whose boundaries separate words.
const BLOCK_ELEMENTS: &[&str] = &["p", "div", "li", "ul", "ol", "tr", "h1", "h2", "h3", "h4", "section"];

/// Collapses every run of whitespace (line breaks included) to one space and
/// trims the ends.
#[must_use]
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of an element with whitespace normalized.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Text nodes joined with single spaces, so adjacent widgets such as
/// `<span>4.9</span><span>120 ulasan</span>` stay separate tokens.
#[must_use]
pub fn spaced_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Like [`element_text`], but `<br>` and block boundaries become spaces so
/// `"baris satu<br>baris dua"` does not fuse into `"baris satubaris dua"`.
#[must_use]
pub fn text_with_breaks(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" || BLOCK_ELEMENTS.contains(&el.name()) => {
                out.push(' ');
            }
            _ => {}
        }
    }
    normalize_whitespace(&out)
}

/// All human-visible text of a document, space separated.
///
/// Used by the regex fallback strategies, which scan the whole page when no
/// selector matched.
#[must_use]
pub fn visible_text(dom: &Html) -> String {
    let mut out = String::new();
    for node in dom.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    normalize_whitespace(&out)
}

/// Returns `Some(text)` when the normalized text is non-empty.
#[must_use]
pub fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn first<'a>(dom: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = Selector::parse(css).unwrap();
        dom.select(&selector).next().unwrap()
    }

    #[test]
    fn normalize_collapses_line_breaks() {
        assert_eq!(normalize_whitespace("  a\n\n b\t c  "), "a b c");
    }

    #[test]
    fn text_with_breaks_keeps_word_boundaries() {
        let dom = Html::parse_fragment("<div id=\"d\">Bahan katun<br>Ukuran L<br/>Warna hitam</div>");
        let el = first(&dom, "#d");
        assert_eq!(text_with_breaks(el), "Bahan katun Ukuran L Warna hitam");
        assert_eq!(element_text(el), "Bahan katunUkuran LWarna hitam");
    }

    #[test]
    fn spaced_text_separates_adjacent_widgets() {
        let dom = Html::parse_fragment("<div id=\"d\"><span>4.9</span><span>120 ulasan</span></div>");
        assert_eq!(spaced_text(first(&dom, "#d")), "4.9 120 ulasan");
    }

    #[test]
    fn visible_text_skips_scripts_and_styles() {
        let dom = Html::parse_document(
            "<html><head><style>.x{}</style></head><body><p>4.8 bintang</p>\
             <script>var rating = 1.0;</script><p>120 ulasan</p></body></html>",
        );
        assert_eq!(visible_text(&dom), "4.8 bintang 120 ulasan");
    }

    #[test]
    fn non_empty_filters_blank() {
        assert_eq!(non_empty(String::new()), None);
        assert_eq!(non_empty("x".to_string()), Some("x".to_string()));
    }
}
