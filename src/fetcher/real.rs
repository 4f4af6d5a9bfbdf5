use super::{FetchOutcome, Fetcher};
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Real HTTP fetcher. Builds one `reqwest::Client` up front -- this is the
/// "open" half of the scoped acquisition/release lifecycle; reqwest's
/// connection pool is released when the client (and every clone of it) is
/// dropped, which is the "close" half, handled by RAII rather than an
/// explicit method.
///
/// Redirect following is out of scope (non-goal): redirects are returned to
/// the caller as their raw 3xx status rather than transparently chased.
pub struct RealFetcher {
    client: Client,
}

impl RealFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for RealFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let start = Instant::now();

        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => FetchOutcome {
                        status,
                        body,
                        duration: start.elapsed(),
                        error: None,
                    },
                    Err(err) => FetchOutcome {
                        status: 0,
                        body: String::new(),
                        duration: start.elapsed(),
                        error: Some(err.to_string()),
                    },
                }
            }
            Err(err) => FetchOutcome {
                status: 0,
                body: String::new(),
                duration: start.elapsed(),
                error: Some(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn successful_fetch_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let fetcher = RealFetcher::new(Duration::from_secs(5)).unwrap();
        let outcome = fetcher.fetch(&format!("{}/ok", server.uri())).await;

        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.body, "hello");
        assert!(outcome.error.is_none());
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn non_2xx_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = RealFetcher::new(Duration::from_secs(5)).unwrap();
        let outcome = fetcher.fetch(&format!("{}/missing", server.uri())).await;

        assert_eq!(outcome.status, 404);
        assert!(outcome.error.is_none());
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn transport_failure_sets_status_zero_and_error() {
        let fetcher = RealFetcher::new(Duration::from_millis(200)).unwrap();
        let outcome = fetcher.fetch("http://127.0.0.1:1").await;

        assert_eq!(outcome.status, 0);
        assert!(outcome.error.is_some());
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn redirect_is_returned_raw_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/redirect"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/target"))
            .mount(&server)
            .await;

        let fetcher = RealFetcher::new(Duration::from_secs(5)).unwrap();
        let outcome = fetcher.fetch(&format!("{}/redirect", server.uri())).await;

        assert_eq!(outcome.status, 302);
    }
}
