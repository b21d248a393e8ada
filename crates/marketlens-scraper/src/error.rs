use marketlens_core::UrlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("browser protocol error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("page at {url} never rendered '{selector}' within {timeout_secs}s")]
    PageLoad {
        url: String,
        selector: String,
        timeout_secs: u64,
    },

    #[error("script evaluation failed while {context}: {reason}")]
    Script { context: String, reason: String },

    #[error("could not advance to review page {page}: {reason}")]
    Navigation { page: u32, reason: String },

    #[error("session exceeded its {limit_secs}s lifetime")]
    SessionTimeout { limit_secs: u64 },

    /// The tab, the browser or its protocol handler is gone.
    #[error("browser session failed: {0}")]
    Session(String),

    #[error(transparent)]
    InvalidUrl(#[from] UrlError),
}
