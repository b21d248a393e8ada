mod pipeline;
mod score;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use marketlens_core::{review_page_url, validate_product_url, AppConfig};
use marketlens_scraper::ChromiumSessionFactory;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::pipeline::Pipeline;
use crate::score::ScoreArgs;

#[derive(Debug, Parser)]
#[command(name = "marketlens")]
#[command(about = "Product metadata, review and seller reputation extraction for Tokopedia")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract metadata, reviews and seller reputation for one product
    Analyze {
        /// Product page URL
        url: String,

        /// Stop after this many reviews (defaults to MARKETLENS_MAX_REVIEWS)
        #[arg(long)]
        max_reviews: Option<usize>,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },
    /// Collect reviews for one product
    Reviews {
        /// Product page URL
        url: String,

        /// Stop after this many reviews (defaults to MARKETLENS_MAX_REVIEWS)
        #[arg(long)]
        max_reviews: Option<usize>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Score seller signals supplied on the command line, without a browser
    Score(ScoreArgs),
    /// Print the review-listing URL for a product URL
    ReviewUrl {
        /// Product page URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = marketlens_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            url,
            max_reviews,
            pretty,
        } => {
            let pipeline = browser_pipeline(&config);
            let max_reviews = max_reviews.unwrap_or(config.max_reviews);
            let report = pipeline.analyze(&url, max_reviews).await?;
            print_json(&report, pretty)?;
        }
        Commands::Reviews {
            url,
            max_reviews,
            pretty,
        } => {
            let pipeline = browser_pipeline(&config);
            let max_reviews = max_reviews.unwrap_or(config.max_reviews);
            let reviews = pipeline.reviews(&url, max_reviews).await?;
            print_json(&reviews, pretty)?;
        }
        Commands::Score(args) => {
            let score = marketlens_reputation::score_seller(&args.to_signals());
            print_json(&score, args.pretty)?;
        }
        Commands::ReviewUrl { url } => {
            let url = validate_product_url(&url, &config.allowed_domains)?;
            println!("{}", review_page_url(&url));
        }
    }

    Ok(())
}

fn browser_pipeline(config: &AppConfig) -> Pipeline {
    let factory = Arc::new(ChromiumSessionFactory::from_app_config(config));
    Pipeline::new(config.clone(), factory)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
