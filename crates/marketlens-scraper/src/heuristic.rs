//! Keyword lexicon that estimates a star rating from review text.
//!
//! Only used when a review's star widget could not be read and heuristic
//! ratings are enabled. Records rated this way are tagged
//! [`RatingSource::Heuristic`](marketlens_core::RatingSource::Heuristic).

/// Review vocabulary weights, Indonesian and English.
///
/// Keys are lowercase single words. The summed score is clamped to
/// `[-1.0, 1.0]` before being mapped to stars.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive
    ("bagus", 0.3),
    ("baik", 0.2),
    ("mantap", 0.4),
    ("mantul", 0.4),
    ("keren", 0.3),
    ("suka", 0.3),
    ("puas", 0.4),
    ("senang", 0.3),
    ("cocok", 0.3),
    ("recommended", 0.4),
    ("rekomen", 0.4),
    ("oke", 0.2),
    ("ok", 0.2),
    ("wangi", 0.2),
    ("enak", 0.3),
    ("murah", 0.2),
    ("cepat", 0.3),
    ("sesuai", 0.3),
    ("ori", 0.3),
    ("original", 0.3),
    ("berkualitas", 0.4),
    ("aman", 0.2),
    ("rapi", 0.2),
    ("worth", 0.3),
    ("love", 0.4),
    ("perfect", 0.5),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("great", 0.4),
    ("good", 0.3),
    ("best", 0.5),
    ("nice", 0.3),
    // Negative
    ("jelek", -0.5),
    ("buruk", -0.5),
    ("kecewa", -0.6),
    ("mengecewakan", -0.6),
    ("tidak", -0.2),
    ("gak", -0.2),
    ("ngga", -0.2),
    ("bau", -0.3),
    ("rusak", -0.6),
    ("cacat", -0.5),
    ("palsu", -0.7),
    ("kw", -0.5),
    ("fake", -0.7),
    ("lambat", -0.4),
    ("lama", -0.2),
    ("mahal", -0.2),
    ("zonk", -0.6),
    ("retur", -0.3),
    ("bad", -0.4),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("horrible", -0.6),
    ("worst", -0.6),
    ("hate", -0.5),
    ("disappointing", -0.6),
];

/// Lexicon score of `text` in `[-1.0, 1.0]`; `0.0` for unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == w) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

/// Maps review text to a 1–5 star estimate. Neutral text is 3 stars.
#[must_use]
pub fn estimate_rating(text: &str) -> u8 {
    let score = lexicon_score(text);
    if score >= 0.6 {
        5
    } else if score >= 0.2 {
        4
    } else if score > -0.2 {
        3
    } else if score > -0.6 {
        2
    } else {
        1
    }
}
