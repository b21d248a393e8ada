//! Seller reputation scoring.
//!
//! Fuses partial seller signals (rating, review volume, badges, operational
//! metrics) into a 0–100 reliability score with a separate confidence score
//! and a human-readable explanation. Missing inputs degrade to neutral
//! assumptions; scoring never fails. Scores can be cached per seller with a
//! fixed time-to-live.

pub mod cache;
pub mod scorer;
pub mod types;

pub use cache::ReputationCache;
pub use scorer::score_seller;
pub use types::{
    Components, CoverageInfo, OperationsComponent, QualityBasis, QualityComponent,
    ReputationScore, SubScore, TrustComponent,
};
