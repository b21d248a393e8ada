//! Offline scoring of seller signals given as command-line flags.

use clap::Args;
use marketlens_core::{Badge, SellerSignals};

#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Seller name, echoed in logs only
    #[arg(long)]
    pub seller: Option<String>,

    /// Store rating out of 5
    #[arg(long)]
    pub rating: Option<f32>,

    /// Number of store reviews
    #[arg(long)]
    pub volume: Option<u64>,

    /// Chat performance percentage
    #[arg(long)]
    pub chat: Option<f32>,

    /// On-time shipping percentage
    #[arg(long)]
    pub shipping: Option<f32>,

    /// Cancellation rate percentage
    #[arg(long)]
    pub cancellation: Option<f32>,

    /// Seller badge: OFFICIAL_STORE, POWER_MERCHANT_PRO or POWER_MERCHANT (repeatable)
    #[arg(long = "badge", value_parser = parse_badge)]
    pub badges: Vec<Badge>,

    /// Pretty-print the JSON score
    #[arg(long)]
    pub pretty: bool,
}

fn parse_badge(raw: &str) -> Result<Badge, String> {
    Badge::parse(raw).ok_or_else(|| {
        format!("unknown badge '{raw}' (expected OFFICIAL_STORE, POWER_MERCHANT_PRO or POWER_MERCHANT)")
    })
}

impl ScoreArgs {
    pub fn to_signals(&self) -> SellerSignals {
        SellerSignals {
            seller_name: self.seller.clone(),
            badges: self.badges.iter().copied().collect(),
            store_rating: self.rating,
            review_volume: self.volume,
            chat_performance: self.chat,
            on_time_shipping: self.shipping,
            cancellation_rate: self.cancellation,
            ..SellerSignals::default()
        }
    }
}
