use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Marketplace domains a product URL may point at. Subdomains are accepted.
    pub allowed_domains: Vec<String>,
    /// Explicit browser executable. When `None` the launcher searches `PATH`.
    pub chrome_path: Option<PathBuf>,
    pub user_agent: String,
    pub max_reviews: usize,
    pub max_pages: u32,
    pub max_consecutive_empty: u32,
    pub page_timeout_secs: u64,
    /// Upper bound on one session, creation to teardown.
    pub session_lifetime_secs: u64,
    pub settle_delay_ms: u64,
    pub pagination_settle_ms: u64,
    pub pagination_retries: u32,
    pub reputation_cache_ttl_secs: u64,
    /// Fill missing review ratings with the keyword lexicon estimate.
    pub heuristic_ratings: bool,
}
