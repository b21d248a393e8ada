//! Seller signals gathered from the product page and the shop page.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Marketplace seller badges, ordered from most to least trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Badge {
    OfficialStore,
    PowerMerchantPro,
    PowerMerchant,
}

impl Badge {
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Badge::OfficialStore => "Official Store",
            Badge::PowerMerchantPro => "Power Merchant PRO",
            Badge::PowerMerchant => "Power Merchant",
        }
    }

    /// Parses `OFFICIAL_STORE`-style identifiers, case-insensitively, also
    /// accepting `-` as separator.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "OFFICIAL_STORE" | "OS" => Some(Badge::OfficialStore),
            "POWER_MERCHANT_PRO" | "PM_PRO" => Some(Badge::PowerMerchantPro),
            "POWER_MERCHANT" | "PM" => Some(Badge::PowerMerchant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Badge::OfficialStore => "OFFICIAL_STORE",
            Badge::PowerMerchantPro => "POWER_MERCHANT_PRO",
            Badge::PowerMerchant => "POWER_MERCHANT",
        };
        f.write_str(id)
    }
}

/// Everything known about a seller. Extraction never fails; gaps are recorded
/// in `notes` and the affected fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerSignals {
    pub seller_name: Option<String>,
    pub badges: BTreeSet<Badge>,
    /// Store rating in `[0.0, 5.0]`.
    pub store_rating: Option<f32>,
    pub review_volume: Option<u64>,
    /// Percentages in `[0, 100]`.
    pub chat_performance: Option<f32>,
    pub on_time_shipping: Option<f32>,
    pub cancellation_rate: Option<f32>,
    pub join_date: Option<String>,
    pub location: Option<String>,
    /// Free text such as `"± 55 menit"`.
    pub processing_time: Option<String>,
    pub notes: Vec<String>,
}

impl SellerSignals {
    /// Highest-trust badge held, if any.
    #[must_use]
    pub fn top_badge(&self) -> Option<Badge> {
        self.badges.iter().next().copied()
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_badge_prefers_official_store() {
        let mut signals = SellerSignals::default();
        signals.badges.insert(Badge::PowerMerchant);
        signals.badges.insert(Badge::OfficialStore);
        assert_eq!(signals.top_badge(), Some(Badge::OfficialStore));
    }

    #[test]
    fn top_badge_none_without_badges() {
        assert_eq!(SellerSignals::default().top_badge(), None);
    }

    #[test]
    fn badge_parse_accepts_variants() {
        assert_eq!(Badge::parse("official_store"), Some(Badge::OfficialStore));
        assert_eq!(Badge::parse("power-merchant-pro"), Some(Badge::PowerMerchantPro));
        assert_eq!(Badge::parse("PM"), Some(Badge::PowerMerchant));
        assert_eq!(Badge::parse("gold"), None);
    }

    #[test]
    fn badge_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&Badge::PowerMerchantPro).unwrap();
        assert_eq!(json, "\"POWER_MERCHANT_PRO\"");
        assert_eq!(Badge::PowerMerchantPro.to_string(), "POWER_MERCHANT_PRO");
    }
}
