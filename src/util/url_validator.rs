use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors produced while checking a feed or entry URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    #[error("Localhost not allowed")]
    Localhost,
}

/// Validates a URL string for use as a feed source.
///
/// Rejects non-HTTP(S) schemes, `localhost`, loopback addresses and private
/// or link-local ranges so an imported subscription list cannot point the
/// reader at internal services.
///
/// ```
/// use feedcycle::util::validate_url;
///
/// assert!(validate_url("https://example.com/feed.xml").is_ok());
/// assert!(validate_url("http://localhost/feed").is_err());
/// assert!(validate_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = parse_http_url(url_str)?;

    if let Some(host) = url.host_str() {
        if host.eq_ignore_ascii_case("localhost") {
            return Err(UrlValidationError::Localhost);
        }

        let bare = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if let Ok(ip) = bare.parse::<IpAddr>() {
            if ip.is_loopback() {
                return Err(UrlValidationError::Localhost);
            }
            if is_private_ip(&ip) {
                return Err(UrlValidationError::PrivateIp(ip.to_string()));
            }
        }
    }

    Ok(url)
}

/// Checks an entry link before it is handed to the system browser.
///
/// Only the scheme matters here: the link is opened by the user's browser,
/// not fetched by us, but anything other than http(s) must never reach
/// `open::that`.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    parse_http_url(url_str.trim())
}

fn parse_http_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local() || v4.is_unspecified(),
        IpAddr::V6(v6) => {
            if v6.is_unspecified() {
                return true;
            }
            let first = v6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link local
            (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_urls_accepted() {
        assert!(validate_url("https://example.com/feed.xml").is_ok());
        assert!(validate_url("http://css-tricks.com/feed").is_ok());
        assert!(validate_url("https://example.com:8443/rss").is_ok());
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        assert!(matches!(
            validate_url("ftp://example.com/feed"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_loopback_rejected() {
        assert!(matches!(
            validate_url("http://LOCALHOST/feed"),
            Err(UrlValidationError::Localhost)
        ));
        assert!(validate_url("http://127.0.0.1/feed").is_err());
        assert!(validate_url("http://[::1]/feed").is_err());
    }

    #[test]
    fn test_private_ranges_rejected() {
        for url in [
            "http://10.0.0.1/feed",
            "http://172.16.0.1/feed",
            "http://192.168.1.1:8080/feed",
            "http://169.254.1.1/feed",
            "http://0.0.0.0/feed",
            "http://[fe80::1]/feed",
            "http://[fd00::1]/feed",
        ] {
            assert!(validate_url(url).is_err(), "{url} should be rejected");
        }
    }

    #[test]
    fn test_unparseable_url() {
        assert!(matches!(
            validate_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_open_allows_any_http_host() {
        assert!(validate_url_for_open("http://127.0.0.1:8000/post").is_ok());
        assert!(validate_url_for_open(" https://example.com/a ").is_ok());
    }

    #[test]
    fn test_open_rejects_other_schemes() {
        assert!(validate_url_for_open("javascript:alert(1)").is_err());
        assert!(validate_url_for_open("file:///tmp/x").is_err());
        assert!(validate_url_for_open("--help").is_err());
    }
}
