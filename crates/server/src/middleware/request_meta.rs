//! Request provenance extraction.
//!
//! Sessions record where they were created from (client IP, browser, OS).
//! The values come from proxy headers and a coarse User-Agent read; they are
//! provenance hints, not security boundaries.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

/// Client provenance captured at login time.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
}

impl RequestMeta {
    /// Read provenance from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip = header_value(headers, "cf-connecting-ip")
            .or_else(|| header_value(headers, "x-real-ip"));

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok());

        Self {
            ip,
            browser: user_agent.map(browser_family),
            os: user_agent.and_then(os_family),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// Coarse browser family from a User-Agent string.
fn browser_family(user_agent: &str) -> String {
    // Order matters: Edge and Opera embed "Chrome", Chrome embeds "Safari"
    for (marker, family) in [
        ("Edg", "Edge"),
        ("OPR", "Opera"),
        ("Firefox", "Firefox"),
        ("Chrome", "Chrome"),
        ("Safari", "Safari"),
    ] {
        if user_agent.contains(marker) {
            return family.to_owned();
        }
    }
    user_agent.chars().take(40).collect()
}

/// Coarse OS family from a User-Agent string.
fn os_family(user_agent: &str) -> Option<String> {
    for (marker, family) in [
        ("Android", "Android"),
        ("iPhone", "iOS"),
        ("iPad", "iOS"),
        ("Windows", "Windows"),
        ("Mac OS X", "macOS"),
        ("Linux", "Linux"),
    ] {
        if user_agent.contains(marker) {
            return Some(family.to_owned());
        }
    }
    None
}

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

    #[test]
    fn test_prefers_cloudflare_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));

        let meta = RequestMeta::from_headers(&headers);
        assert_eq!(meta.ip.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));

        let meta = RequestMeta::from_headers(&headers);
        assert_eq!(meta.ip.as_deref(), Some("198.51.100.1"));
    }

    #[test]
    fn test_user_agent_families() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(CHROME_UA));

        let meta = RequestMeta::from_headers(&headers);
        assert_eq!(meta.browser.as_deref(), Some("Chrome"));
        assert_eq!(meta.os.as_deref(), Some("Windows"));
    }

    #[test]
    fn test_empty_headers() {
        let meta = RequestMeta::from_headers(&HeaderMap::new());
        assert!(meta.ip.is_none());
        assert!(meta.browser.is_none());
        assert!(meta.os.is_none());
    }
}
