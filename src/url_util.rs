//! URL admission helpers: scheme check, fragment stripping, host extraction.
//!
//! Deliberately thin -- the frontier's contract only requires fragment
//! stripping and an http/https scheme filter (`Non-goals: URL canonicalization
//! beyond fragment stripping`). Query strings, case, and path segments are
//! left untouched.

use url::Url;

/// The synthetic host assigned to a URL with no authority component.
pub const UNKNOWN_HOST: &str = "unknown";

/// Parses `raw`, strips any fragment, and returns the normalized string form
/// plus its host. Returns `None` if the URL is malformed or its scheme is
/// not http/https.
pub fn admit(raw: &str) -> Option<(String, String)> {
    let mut url = Url::parse(raw).ok()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);

    let host = url.host_str().map_or_else(
        || UNKNOWN_HOST.to_string(),
        |h| match url.port() {
            Some(port) => format!("{h}:{port}"),
            None => h.to_string(),
        },
    );

    Some((url.into(), host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fragment() {
        let (url, host) = admit("https://example.com/page#section").unwrap();
        assert_eq!(url, "https://example.com/page");
        assert_eq!(host, "example.com");
    }

    #[test]
    fn keeps_query() {
        let (url, _) = admit("https://example.com/page?q=1#frag").unwrap();
        assert_eq!(url, "https://example.com/page?q=1");
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(admit("ftp://example.com/file").is_none());
        assert!(admit("mailto:a@b.com").is_none());
    }

    #[test]
    fn rejects_malformed() {
        assert!(admit("not a url").is_none());
    }

    #[test]
    fn http_is_allowed() {
        assert!(admit("http://example.com/").is_some());
    }

    #[test]
    fn fragment_only_difference_is_same_url() {
        let (a, _) = admit("https://example.com/x").unwrap();
        let (b, _) = admit("https://example.com/x#frag").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_explicit_ports_are_distinct_hosts() {
        let (_, host_a) = admit("https://example.com:8080/").unwrap();
        let (_, host_b) = admit("https://example.com:9090/").unwrap();
        assert_ne!(host_a, host_b);
        assert_eq!(host_a, "example.com:8080");
        assert_eq!(host_b, "example.com:9090");
    }

    #[test]
    fn default_port_is_not_appended() {
        let (_, host) = admit("https://example.com:443/").unwrap();
        assert_eq!(host, "example.com");
    }
}
