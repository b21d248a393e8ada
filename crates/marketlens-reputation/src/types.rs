use serde::{Deserialize, Serialize};

/// What the quality component was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBasis {
    /// Store rating smoothed toward the prior by review volume.
    RatingAndVolume,
    /// Store rating blended with the prior at a fixed ratio.
    RatingOnly,
    /// No rating; the prior is assumed.
    Prior,
}

/// Rating-driven share of the score, worth up to 50 points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityComponent {
    pub score: f64,
    pub basis: QualityBasis,
    pub observed_rating: Option<f64>,
    pub adjusted_rating: f64,
    pub review_count: u64,
    /// Smoothing weight given to the observed rating, `[0, 1]`.
    pub weight: Option<f64>,
}

/// One operational metric's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub score: f64,
    /// `false` when the neutral assumption was used.
    pub observed: bool,
}

/// Chat, shipping and cancellation metrics, worth up to 30 points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationsComponent {
    pub score: f64,
    pub chat: SubScore,
    pub shipping: SubScore,
    pub cancellation: SubScore,
    /// Weighted fraction of metrics actually observed, `[0, 1]`.
    pub coverage: f64,
}

/// Badges, tenure and popularity, capped at 20 points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustComponent {
    pub score: f64,
    pub badges: f64,
    /// Always `0.0`; join dates are collected but not yet scored.
    pub tenure: f64,
    pub popularity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub quality: QualityComponent,
    pub operations: OperationsComponent,
    pub trust: TrustComponent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageInfo {
    /// Operations coverage as a percentage.
    pub operations_coverage: f64,
    /// Set when the total was capped because too little operations data was
    /// observed.
    pub cap_applied: Option<String>,
}

/// Seller reliability with its own meta-certainty.
///
/// All numbers are rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationScore {
    /// `[0, 100]`.
    pub reliability_score: f64,
    /// `[0, 100]`.
    pub confidence_score: f64,
    pub components: Components,
    pub coverage: CoverageInfo,
    pub explanation: String,
}
