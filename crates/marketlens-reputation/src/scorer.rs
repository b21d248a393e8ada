//! Seller reliability scoring.
//!
//! Three buckets sum to at most 100 points:
//!
//! | Bucket | Points | Inputs |
//! |--------|--------|--------|
//! | Quality | 50 | store rating, review volume |
//! | Operations | 30 | chat performance, on-time shipping, cancellation rate |
//! | Trust | 20 (capped) | badges, tenure, popularity |
//!
//! Missing inputs are replaced by neutral assumptions and lower the
//! confidence score instead of the reliability score.

use marketlens_core::{Badge, SellerSignals};

use crate::types::{
    Components, CoverageInfo, OperationsComponent, QualityBasis, QualityComponent,
    ReputationScore, SubScore, TrustComponent,
};

const PRIOR_RATING: f64 = 4.0;
/// Review volume at which the observed rating gets full weight.
const CONFIDENCE_THRESHOLD: f64 = 50.0;
/// Share of the observed rating when no volume is known.
const RATING_ONLY_WEIGHT: f64 = 0.7;

const QUALITY_POINTS: f64 = 50.0;
const OPERATIONS_POINTS: f64 = 30.0;
const TRUST_POINTS: f64 = 20.0;

const CHAT_WEIGHT: f64 = 0.15;
const SHIPPING_WEIGHT: f64 = 0.10;
const CANCELLATION_WEIGHT: f64 = 0.05;

const NEUTRAL_CHAT: f64 = 70.0;
const NEUTRAL_SHIPPING: f64 = 70.0;
const NEUTRAL_CANCELLATION: f64 = 30.0;

const CHAT_COVERAGE: f64 = 0.50;
const SHIPPING_COVERAGE: f64 = 0.33;
const CANCELLATION_COVERAGE: f64 = 0.17;

const LOW_COVERAGE: f64 = 0.5;
const LOW_COVERAGE_CAP: f64 = 90.0;
const LOW_COVERAGE_REASON: &str = "Limited operations data";

const LOW_CONFIDENCE: f64 = 60.0;
const MODERATE_CONFIDENCE: f64 = 80.0;

fn badge_points(badge: Badge) -> f64 {
    match badge {
        Badge::OfficialStore => 12.0,
        Badge::PowerMerchantPro => 8.0,
        Badge::PowerMerchant => 5.0,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Finite, positive rating clamped to the five-star scale. Zero means the
/// shop has not been rated yet.
fn observed_rating(signals: &SellerSignals) -> Option<f64> {
    signals
        .store_rating
        .map(f64::from)
        .filter(|r| r.is_finite() && *r > 0.0)
        .map(|r| r.min(5.0))
}

fn observed_volume(signals: &SellerSignals) -> Option<u64> {
    signals.review_volume.filter(|v| *v > 0)
}

fn observed_percent(value: Option<f32>) -> Option<f64> {
    value
        .map(f64::from)
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0))
}

/// Returns the component and its confidence factor.
#[allow(clippy::cast_precision_loss)]
fn quality_component(rating: Option<f64>, volume: Option<u64>) -> (QualityComponent, f64) {
    match (rating, volume) {
        (Some(observed), Some(count)) => {
            let weight = (count as f64 / CONFIDENCE_THRESHOLD).min(1.0);
            let adjusted = weight * observed + (1.0 - weight) * PRIOR_RATING;
            let component = QualityComponent {
                score: adjusted / 5.0 * QUALITY_POINTS,
                basis: QualityBasis::RatingAndVolume,
                observed_rating: Some(observed),
                adjusted_rating: adjusted,
                review_count: count,
                weight: Some(weight),
            };
            (component, 1.0)
        }
        (Some(observed), None) => {
            let adjusted = RATING_ONLY_WEIGHT * observed + (1.0 - RATING_ONLY_WEIGHT) * PRIOR_RATING;
            let component = QualityComponent {
                score: adjusted / 5.0 * QUALITY_POINTS,
                basis: QualityBasis::RatingOnly,
                observed_rating: Some(observed),
                adjusted_rating: adjusted,
                review_count: 0,
                weight: None,
            };
            (component, 0.7)
        }
        (None, _) => {
            let component = QualityComponent {
                score: PRIOR_RATING / 5.0 * QUALITY_POINTS,
                basis: QualityBasis::Prior,
                observed_rating: None,
                adjusted_rating: PRIOR_RATING,
                review_count: volume.unwrap_or(0),
                weight: None,
            };
            (component, 0.3)
        }
    }
}

fn sub_score(value: Option<f64>, neutral: f64, weight: f64) -> SubScore {
    SubScore {
        score: value.unwrap_or(neutral) * weight,
        observed: value.is_some(),
    }
}

/// Returns the component and the number of metrics observed.
fn operations_component(signals: &SellerSignals) -> (OperationsComponent, usize) {
    let chat = observed_percent(signals.chat_performance);
    let shipping = observed_percent(signals.on_time_shipping);
    let cancellation = observed_percent(signals.cancellation_rate);

    let chat_score = sub_score(chat, NEUTRAL_CHAT, CHAT_WEIGHT);
    let shipping_score = sub_score(shipping, NEUTRAL_SHIPPING, SHIPPING_WEIGHT);
    let cancellation_score = SubScore {
        score: (100.0 - cancellation.unwrap_or(NEUTRAL_CANCELLATION)) * CANCELLATION_WEIGHT,
        observed: cancellation.is_some(),
    };

    let mut coverage = 0.0;
    let mut observed = 0;
    for (present, share) in [
        (chat.is_some(), CHAT_COVERAGE),
        (shipping.is_some(), SHIPPING_COVERAGE),
        (cancellation.is_some(), CANCELLATION_COVERAGE),
    ] {
        if present {
            coverage += share;
            observed += 1;
        }
    }

    let component = OperationsComponent {
        score: (chat_score.score + shipping_score.score + cancellation_score.score)
            .min(OPERATIONS_POINTS),
        chat: chat_score,
        shipping: shipping_score,
        cancellation: cancellation_score,
        coverage: coverage.min(1.0),
    };
    (component, observed)
}

/// Returns the component and its confidence factor.
#[allow(clippy::cast_precision_loss)]
fn trust_component(signals: &SellerSignals, volume: Option<u64>) -> (TrustComponent, f64) {
    let badges = signals.top_badge().map_or(0.0, badge_points);
    let tenure = 0.0;
    let popularity = volume.map_or(0.0, |v| ((v as f64).log10() - 1.0).clamp(0.0, 3.0));

    let component = TrustComponent {
        score: (badges + tenure + popularity).min(TRUST_POINTS),
        badges,
        tenure,
        popularity,
    };
    let confidence = if badges > 0.0 { 1.0 } else { 0.5 };
    (component, confidence)
}

fn explain(signals: &SellerSignals, rating: Option<f64>, volume: Option<u64>, confidence: f64) -> String {
    let mut parts: Vec<String> = signals
        .badges
        .iter()
        .map(|b| b.display_name().to_string())
        .collect();
    if rating.is_some() {
        if let Some(raw) = signals.store_rating {
            parts.push(format!("{}/5 rating", raw.min(5.0)));
        }
    }
    if let Some(count) = volume {
        if count >= 1000 {
            #[allow(clippy::cast_precision_loss)]
            let thousands = count as f64 / 1000.0;
            parts.push(format!("{thousands:.1}k reviews"));
        } else {
            parts.push(format!("{count} reviews"));
        }
    }

    let mut explanation = if parts.is_empty() {
        "Limited data available".to_string()
    } else {
        parts.join(", ")
    };
    if confidence < LOW_CONFIDENCE {
        explanation.push_str(" (low confidence - limited data)");
    } else if confidence < MODERATE_CONFIDENCE {
        explanation.push_str(" (moderate confidence - some data missing)");
    }
    explanation
}

/// Scores a seller. Never fails; absent signals fall back to neutral values.
///
/// The total is capped at 90 when fewer than two operations metrics were
/// observed, so near-perfect scores cannot rest on assumed data.
#[must_use]
pub fn score_seller(signals: &SellerSignals) -> ReputationScore {
    let rating = observed_rating(signals);
    let volume = observed_volume(signals);

    let (quality, quality_confidence) = quality_component(rating, volume);
    let (operations, observed_metrics) = operations_component(signals);
    let (trust, trust_confidence) = trust_component(signals, volume);

    let mut total = quality.score + operations.score + trust.score;
    let cap_applied = if operations.coverage < LOW_COVERAGE || observed_metrics < 2 {
        total = total.min(LOW_COVERAGE_CAP);
        Some(LOW_COVERAGE_REASON.to_string())
    } else {
        None
    };
    let total = total.clamp(0.0, 100.0);

    let confidence = (quality_confidence * QUALITY_POINTS
        + operations.coverage * OPERATIONS_POINTS
        + trust_confidence * TRUST_POINTS)
        .clamp(0.0, 100.0);

    let explanation = explain(signals, rating, volume, confidence);
    tracing::debug!(
        seller = signals.seller_name.as_deref().unwrap_or(""),
        reliability = total,
        confidence,
        quality = quality.score,
        operations = operations.score,
        trust = trust.score,
        "seller scored"
    );

    ReputationScore {
        reliability_score: round1(total),
        confidence_score: round1(confidence),
        coverage: CoverageInfo {
            operations_coverage: round1(operations.coverage * 100.0),
            cap_applied,
        },
        components: Components {
            quality: QualityComponent {
                score: round1(quality.score),
                adjusted_rating: (quality.adjusted_rating * 100.0).round() / 100.0,
                weight: quality.weight.map(|w| (w * 100.0).round() / 100.0),
                ..quality
            },
            operations: OperationsComponent {
                score: round1(operations.score),
                chat: SubScore {
                    score: round1(operations.chat.score),
                    ..operations.chat
                },
                shipping: SubScore {
                    score: round1(operations.shipping.score),
                    ..operations.shipping
                },
                cancellation: SubScore {
                    score: round1(operations.cancellation.score),
                    ..operations.cancellation
                },
                coverage: operations.coverage,
            },
            trust: TrustComponent {
                score: round1(trust.score),
                badges: round1(trust.badges),
                tenure: trust.tenure,
                popularity: round1(trust.popularity),
            },
        },
        explanation,
    }
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;
