use super::{FetchOutcome, Fetcher};
use crate::dns::DnsResolver;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Simulated fetcher: performs a real (best-effort) DNS query for the URL's
/// host, then sleeps a fixed delay instead of reading a real response body.
/// Lets the frontier/worker plant be stressed with reproducible latency
/// while retaining real DNS pressure.
pub struct SimulatedFetcher {
    delay: Duration,
    dns_resolver: Option<Arc<DnsResolver>>,
}

impl SimulatedFetcher {
    pub fn new(delay_ms: u64, dns_resolver: Option<Arc<DnsResolver>>) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            dns_resolver,
        }
    }
}

#[async_trait]
impl Fetcher for SimulatedFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let start = Instant::now();

        if let Some(resolver) = &self.dns_resolver {
            if let Ok(parsed) = Url::parse(url) {
                if let Some(host) = parsed.host_str() {
                    // Best-effort: resolution errors never fail the fetch.
                    let _ = resolver.resolve(host).await;
                }
            }
        }

        tokio::time::sleep(self.delay).await;

        FetchOutcome {
            status: 200,
            body: String::new(),
            duration: start.elapsed(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sleeps_for_configured_delay() {
        let fetcher = SimulatedFetcher::new(20, None);
        let outcome = fetcher.fetch("https://example.com/").await;

        assert_eq!(outcome.status, 200);
        assert!(outcome.error.is_none());
        assert!(outcome.duration >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn works_without_a_resolver() {
        let fetcher = SimulatedFetcher::new(0, None);
        let outcome = fetcher.fetch("https://example.com/").await;
        assert!(outcome.is_success());
    }
}
