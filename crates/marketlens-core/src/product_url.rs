//! Product URL validation and the identities derived from it.

use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Structured reason a product URL was rejected before any browser work.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("could not parse URL: {0}")]
    Malformed(String),

    #[error("unsupported scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("domain '{host}' is not allowed (allowed: {allowed})")]
    DomainNotAllowed { host: String, allowed: String },
}

/// Parses `raw` and checks it points at one of `allowed_domains` or a
/// subdomain of one.
///
/// # Errors
///
/// Returns [`UrlError`] describing the first check that failed.
pub fn validate_product_url(raw: &str, allowed_domains: &[String]) -> Result<Url, UrlError> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Malformed(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::UnsupportedScheme(other.to_string())),
    }

    let host = url
        .host_str()
        .map(str::to_ascii_lowercase)
        .ok_or(UrlError::MissingHost)?;

    let allowed = allowed_domains.iter().any(|domain| {
        let domain = domain.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    });
    if !allowed {
        return Err(UrlError::DomainNotAllowed {
            host,
            allowed: allowed_domains.join(", "),
        });
    }

    Ok(url)
}

/// Review-listing URL for a product page: query and fragment dropped, `/review`
/// appended unless the path already ends with it.
#[must_use]
pub fn review_page_url(product_url: &Url) -> String {
    let mut cleaned = product_url.clone();
    cleaned.set_query(None);
    cleaned.set_fragment(None);

    let base = cleaned.as_str();
    if base.ends_with("/review") {
        base.to_string()
    } else if base.ends_with('/') {
        format!("{base}review")
    } else {
        format!("{base}/review")
    }
}

/// Cache key identifying the seller behind a product URL.
///
/// Product URLs look like `/{shop}/{product-slug}`, so the first two path
/// segments are used. URLs without two segments fall back to the host plus a
/// short digest of the full URL.
#[must_use]
pub fn seller_cache_key(product_url: &Url) -> String {
    let segments: Vec<&str> = product_url
        .path_segments()
        .map(|segs| segs.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if let [first, second, ..] = segments.as_slice() {
        return format!("shop_{first}_{second}");
    }

    let digest = Sha256::digest(product_url.as_str().as_bytes());
    let short: String = digest[..4].iter().map(|b| format!("{b:02x}")).collect();
    format!("shop_{}_{short}", product_url.host_str().unwrap_or("unknown"))
}
