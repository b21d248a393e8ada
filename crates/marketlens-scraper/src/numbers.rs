//! Locale-tolerant number parsing for marketplace labels.
//!
//! Tokopedia renders counts in Indonesian conventions: `.` as the thousands
//! separator (`"3.554"`), `,` as the decimal mark (`"1,5 jt"`), and
//! abbreviated magnitudes (`"6 rb"`, `"1.2k"`, `"2 jt"`). Ratings use `.` or
//! `,` as the decimal mark (`"4.9"`, `"4,9"`).

use std::sync::LazyLock;

use regex::Regex;

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)*)\s*(ribu|rb|k|juta|jt)?\b").expect("valid regex")
});

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)").expect("valid regex"));

/// Multiplier for an abbreviated magnitude suffix.
fn suffix_multiplier(suffix: &str) -> Option<f64> {
    match suffix.to_ascii_lowercase().as_str() {
        "k" | "rb" | "ribu" => Some(1_000.0),
        "jt" | "juta" => Some(1_000_000.0),
        _ => None,
    }
}

/// Parses the first count in `raw`.
///
/// With a magnitude suffix the number is read as a decimal (`"1,5 jt"` is
/// 1,500,000). Without one, separators are thousands separators (`"3.554"` is
/// 3554).
///
/// ```
/// use marketlens_scraper::numbers::parse_count;
/// assert_eq!(parse_count("6 rb"), Some(6_000));
/// assert_eq!(parse_count("(1.2k)"), Some(1_200));
/// assert_eq!(parse_count("2 jt"), Some(2_000_000));
/// assert_eq!(parse_count("3.554 ulasan"), Some(3_554));
/// ```
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn parse_count(raw: &str) -> Option<u64> {
    let caps = COUNT_RE.captures(raw)?;
    let digits = caps.get(1)?.as_str();

    match caps.get(2).and_then(|m| suffix_multiplier(m.as_str())) {
        Some(multiplier) => {
            let value: f64 = digits.replace(',', ".").parse().ok()?;
            let scaled = (value * multiplier).round();
            (scaled >= 0.0 && scaled < u64::MAX as f64).then_some(scaled as u64)
        }
        None => digits.replace(['.', ','], "").parse().ok(),
    }
}

/// Parses the first decimal number in `raw`, accepting `,` as decimal mark.
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<f32> {
    let caps = DECIMAL_RE.captures(raw)?;
    caps.get(1)?.as_str().replace(',', ".").parse().ok()
}

/// Parses a star rating and keeps it only when it lies in `[1.0, 5.0]`.
#[must_use]
pub fn parse_rating(raw: &str) -> Option<f32> {
    parse_decimal(raw).filter(|r| (1.0..=5.0).contains(r))
}

/// Parses a percentage such as `"98%"` or `"97,5 %"` into `[0, 100]`.
#[must_use]
pub fn parse_percent(raw: &str) -> Option<f32> {
    parse_decimal(raw).filter(|p| (0.0..=100.0).contains(p))
}
