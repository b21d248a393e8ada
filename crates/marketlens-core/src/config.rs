use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but malformed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but malformed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config. Parsing is decoupled from the process environment so tests can
/// drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("MARKETLENS_ENV", "development"))?;
    let log_level = or_default("MARKETLENS_LOG_LEVEL", "info");

    let allowed_domains = parse_domain_list(&or_default("MARKETLENS_ALLOWED_DOMAINS", "tokopedia.com"));
    if allowed_domains.is_empty() {
        return Err(invalid(
            "MARKETLENS_ALLOWED_DOMAINS",
            "at least one domain is required".to_string(),
        ));
    }

    let chrome_path = lookup("MARKETLENS_CHROME_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let user_agent = or_default("MARKETLENS_USER_AGENT", DEFAULT_USER_AGENT);

    let max_reviews = parse_usize("MARKETLENS_MAX_REVIEWS", "50")?;
    let max_pages = parse_u32("MARKETLENS_MAX_PAGES", "8")?;
    if max_pages == 0 {
        return Err(invalid("MARKETLENS_MAX_PAGES", "must be at least 1".to_string()));
    }
    let max_consecutive_empty = parse_u32("MARKETLENS_MAX_CONSECUTIVE_EMPTY", "2")?;
    if max_consecutive_empty == 0 {
        return Err(invalid(
            "MARKETLENS_MAX_CONSECUTIVE_EMPTY",
            "must be at least 1".to_string(),
        ));
    }
    let page_timeout_secs = parse_u64("MARKETLENS_PAGE_TIMEOUT_SECS", "15")?;
    let session_lifetime_secs = parse_u64("MARKETLENS_SESSION_LIFETIME_SECS", "300")?;
    let settle_delay_ms = parse_u64("MARKETLENS_SETTLE_DELAY_MS", "2000")?;
    let pagination_settle_ms = parse_u64("MARKETLENS_PAGINATION_SETTLE_MS", "3000")?;
    let pagination_retries = parse_u32("MARKETLENS_PAGINATION_RETRIES", "1")?;
    let reputation_cache_ttl_secs = parse_u64("MARKETLENS_REPUTATION_CACHE_TTL_SECS", "86400")?;
    let heuristic_ratings = parse_bool(
        "MARKETLENS_HEURISTIC_RATINGS",
        &or_default("MARKETLENS_HEURISTIC_RATINGS", "false"),
    )?;

    Ok(AppConfig {
        env,
        log_level,
        allowed_domains,
        chrome_path,
        user_agent,
        max_reviews,
        max_pages,
        max_consecutive_empty,
        page_timeout_secs,
        session_lifetime_secs,
        settle_delay_ms,
        pagination_settle_ms,
        pagination_retries,
        reputation_cache_ttl_secs,
        heuristic_ratings,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MARKETLENS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// Split a comma-separated domain list, lower-casing and dropping blanks and
/// any leading `www.`.
fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().to_ascii_lowercase())
        .map(|d| d.strip_prefix("www.").map(str::to_owned).unwrap_or(d))
        .filter(|d| !d.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
