use super::*;

fn signals() -> SellerSignals {
    SellerSignals::default()
}

#[test]
fn high_volume_rating_gets_full_weight() {
    let mut s = signals();
    s.store_rating = Some(4.9);
    s.review_volume = Some(6000);
    let score = score_seller(&s);
    let quality = &score.components.quality;
    assert_eq!(quality.basis, QualityBasis::RatingAndVolume);
    assert_eq!(quality.weight, Some(1.0));
    assert_eq!(quality.score, 49.0);
}

#[test]
fn low_volume_rating_is_smoothed_toward_prior() {
    let mut s = signals();
    s.store_rating = Some(4.9);
    s.review_volume = Some(25);
    let quality = score_seller(&s).components.quality;
    assert_eq!(quality.weight, Some(0.5));
    assert_eq!(quality.adjusted_rating, 4.45);
    assert_eq!(quality.score, 44.5);
}

#[test]
fn rating_without_volume_is_blended_at_fixed_ratio() {
    let mut s = signals();
    s.store_rating = Some(5.0);
    let score = score_seller(&s);
    assert_eq!(score.components.quality.basis, QualityBasis::RatingOnly);
    assert_eq!(score.components.quality.score, 47.0);
    // 0.7 * 50 + 0 * 30 + 0.5 * 20
    assert_eq!(score.confidence_score, 45.0);
}

#[test]
fn zero_rating_counts_as_unrated() {
    let mut s = signals();
    s.store_rating = Some(0.0);
    let score = score_seller(&s);
    assert_eq!(score.components.quality.basis, QualityBasis::Prior);
    assert_eq!(score.components.quality.score, 40.0);
}

#[test]
fn empty_signals_score_neutral() {
    let score = score_seller(&signals());
    assert_eq!(score.components.quality.score, 40.0);
    assert_eq!(score.components.operations.score, 21.0);
    assert!(!score.components.operations.chat.observed);
    assert_eq!(score.components.trust.score, 0.0);
    assert_eq!(score.reliability_score, 61.0);
    assert_eq!(score.confidence_score, 25.0);
    assert!(score.confidence_score <= 40.0);
    assert_eq!(score.coverage.operations_coverage, 0.0);
    assert_eq!(
        score.explanation,
        "Limited data available (low confidence - limited data)"
    );
}

#[test]
fn single_operations_metric_caps_total_at_ninety() {
    let mut s = signals();
    s.store_rating = Some(5.0);
    s.review_volume = Some(10_000);
    s.chat_performance = Some(100.0);
    s.badges.insert(Badge::OfficialStore);
    let score = score_seller(&s);
    // 50 + (15 + 7 + 3.5) + (12 + 3) = 90.5 before the cap.
    assert_eq!(score.reliability_score, 90.0);
    assert_eq!(score.coverage.operations_coverage, 50.0);
    assert_eq!(score.coverage.cap_applied.as_deref(), Some("Limited operations data"));
}

#[test]
fn full_data_scores_without_cap() {
    let mut s = signals();
    s.store_rating = Some(5.0);
    s.review_volume = Some(100_000);
    s.chat_performance = Some(100.0);
    s.on_time_shipping = Some(100.0);
    s.cancellation_rate = Some(0.0);
    s.badges.insert(Badge::OfficialStore);
    let score = score_seller(&s);
    assert_eq!(score.components.operations.score, 30.0);
    assert_eq!(score.components.trust.popularity, 3.0);
    assert_eq!(score.reliability_score, 95.0);
    assert_eq!(score.confidence_score, 100.0);
    assert!(score.coverage.cap_applied.is_none());
    assert_eq!(score.explanation, "Official Store, 5/5 rating, 100.0k reviews");
}

#[test]
fn cancellation_rate_is_inverted() {
    let mut s = signals();
    s.cancellation_rate = Some(10.0);
    let ops = score_seller(&s).components.operations;
    assert!(ops.cancellation.observed);
    assert_eq!(ops.cancellation.score, 4.5);
}

#[test]
fn only_the_highest_badge_counts() {
    let mut s = signals();
    s.badges.insert(Badge::PowerMerchant);
    s.badges.insert(Badge::PowerMerchantPro);
    let trust = score_seller(&s).components.trust;
    assert_eq!(trust.badges, 8.0);
    assert_eq!(trust.tenure, 0.0);
}

#[test]
fn popularity_follows_log_volume() {
    let mut s = signals();
    s.review_volume = Some(5);
    assert_eq!(score_seller(&s).components.trust.popularity, 0.0);
    s.review_volume = Some(1000);
    assert_eq!(score_seller(&s).components.trust.popularity, 2.0);
    s.review_volume = Some(50_000_000);
    assert_eq!(score_seller(&s).components.trust.popularity, 3.0);
}

#[test]
fn explanation_lists_badges_rating_then_volume() {
    let mut s = signals();
    s.badges.insert(Badge::PowerMerchant);
    s.store_rating = Some(4.5);
    s.review_volume = Some(120);
    let score = score_seller(&s);
    // 1.0 * 50 + 0 * 30 + 1.0 * 20
    assert_eq!(score.confidence_score, 70.0);
    assert_eq!(
        score.explanation,
        "Power Merchant, 4.5/5 rating, 120 reviews (moderate confidence - some data missing)"
    );
}

#[test]
fn thousands_of_reviews_are_abbreviated() {
    let mut s = signals();
    s.store_rating = Some(4.9);
    s.review_volume = Some(6000);
    assert!(score_seller(&s).explanation.starts_with("4.9/5 rating, 6.0k reviews"));
}

#[test]
fn scores_stay_in_bounds_for_extreme_inputs() {
    let ratings = [None, Some(0.0), Some(1.0), Some(7.5), Some(f32::NAN)];
    let volumes = [None, Some(0), Some(1), Some(u64::MAX)];
    let percents = [None, Some(-20.0), Some(0.0), Some(150.0)];
    for rating in ratings {
        for volume in volumes {
            for pct in percents {
                let mut s = signals();
                s.store_rating = rating;
                s.review_volume = volume;
                s.chat_performance = pct;
                s.on_time_shipping = pct;
                s.cancellation_rate = pct;
                s.badges.insert(Badge::OfficialStore);
                let score = score_seller(&s);
                assert!(
                    (0.0..=100.0).contains(&score.reliability_score),
                    "reliability out of bounds for {s:?}: {}",
                    score.reliability_score
                );
                assert!(
                    (0.0..=100.0).contains(&score.confidence_score),
                    "confidence out of bounds for {s:?}: {}",
                    score.confidence_score
                );
            }
        }
    }
}

#[test]
fn fewer_than_two_metrics_never_exceed_ninety() {
    for (chat, shipping, cancellation) in [
        (Some(100.0), None, None),
        (None, Some(100.0), None),
        (None, None, Some(0.0)),
        (None, None, None),
    ] {
        let mut s = signals();
        s.store_rating = Some(5.0);
        s.review_volume = Some(1_000_000);
        s.badges.insert(Badge::OfficialStore);
        s.chat_performance = chat;
        s.on_time_shipping = shipping;
        s.cancellation_rate = cancellation;
        assert!(score_seller(&s).reliability_score <= 90.0);
    }
}

#[test]
fn score_serializes_with_snake_case_basis() {
    let json = serde_json::to_value(score_seller(&signals())).unwrap();
    assert_eq!(json["components"]["quality"]["basis"], "prior");
    assert_eq!(json["reliability_score"], 61.0);
}
