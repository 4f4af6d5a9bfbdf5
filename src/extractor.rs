//! HTML link extraction. Best-effort: a malformed document or unparseable
//! anchor never propagates an error, it is simply skipped -- the extractor
//! contract treats parse failure as "produces an empty link list", not a
//! fatal error.

use scraper::{Html, Selector};
use url::Url;

/// Extracts absolute `href` targets from `<a>` tags in `body`, resolving
/// relative links against `base`. Anchors with no `href`, unparseable
/// `href`s, and non-http(s) schemes are silently dropped.
pub fn extract(body: &str, base: &str) -> Vec<String> {
    let Ok(base_url) = Url::parse(base) else {
        return Vec::new();
    };

    let document = Html::parse_document(body);
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| base_url.join(href).ok())
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .map(|url| url.into())
        .collect()
}

/// Capability the worker pool calls after a successful fetch. Real crawling
/// and simulation each implement this the same way they realize `Fetcher`:
/// as interchangeable variants, not a branch at the call site.
pub trait LinkExtractor: Send + Sync {
    fn extract(&self, body: &str, url: &str) -> Vec<String>;
}

/// Extracts `<a href>` targets from a real fetch's HTML body.
pub struct HtmlExtractor;

impl LinkExtractor for HtmlExtractor {
    fn extract(&self, body: &str, url: &str) -> Vec<String> {
        extract(body, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_absolute_links() {
        let body = r#"<html><body><a href="https://other.example/page">x</a></body></html>"#;
        let links = extract(body, "https://example.com/");
        assert_eq!(links, vec!["https://other.example/page"]);
    }

    #[test]
    fn resolves_relative_links_against_base() {
        let body = r#"<a href="/about">about</a>"#;
        let links = extract(body, "https://example.com/section/");
        assert_eq!(links, vec!["https://example.com/about"]);
    }

    #[test]
    fn drops_non_http_schemes() {
        let body = r#"<a href="mailto:a@b.com">mail</a><a href="https://ok.example/">ok</a>"#;
        let links = extract(body, "https://example.com/");
        assert_eq!(links, vec!["https://ok.example/"]);
    }

    #[test]
    fn empty_body_yields_no_links() {
        assert!(extract("", "https://example.com/").is_empty());
    }

    #[test]
    fn malformed_html_does_not_panic() {
        let body = "<a href=https://example.com/unclosed";
        let _ = extract(body, "https://example.com/");
    }

    #[test]
    fn invalid_base_yields_no_links() {
        assert!(extract("<a href=\"/x\">x</a>", "not a url").is_empty());
    }
}
