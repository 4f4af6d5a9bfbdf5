//! Telemetry: nine Prometheus metrics sharing one fixed label set, plus a
//! scrape server. Constructed once per run and passed by `Arc` to every
//! component that needs to record a measurement -- no hidden module-level
//! registries.

use axum::{extract::State, routing::get, Router};
use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;

const DURATION_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

pub struct Telemetry {
    registry: Registry,
    pub pages_crawled: IntCounter,
    pub active_requests: IntGauge,
    pub queue_size: IntGauge,
    pub request_duration: Histogram,
    pub dns_cache_hits: IntCounter,
    pub dns_cache_misses: IntCounter,
    pub dns_cache_size: Gauge,
    pub fetch_success: IntCounter,
    pub fetch_failure: IntCounter,
}

impl Telemetry {
    /// Builds the registry and binds all nine metrics to the fixed label set
    /// `{mode, dns_cache, workers}`, assigned once here and never varied.
    pub fn new(mode: &str, dns_cache: bool, workers: usize) -> prometheus::Result<Self> {
        let registry = Registry::new();
        let labels = const_labels(mode, dns_cache, workers);

        let pages_crawled = IntCounter::with_opts(
            Opts::new("crawler_pages_crawled_total", "Total pages crawled").const_labels(labels.clone()),
        )?;
        let active_requests = IntGauge::with_opts(
            Opts::new("crawler_active_requests", "In-flight fetches right now").const_labels(labels.clone()),
        )?;
        let queue_size = IntGauge::with_opts(
            Opts::new("crawler_queue_size", "URLs waiting in frontier").const_labels(labels.clone()),
        )?;
        let request_duration = Histogram::with_opts(
            HistogramOpts::new("crawler_request_duration_seconds", "Per-fetch elapsed seconds")
                .const_labels(labels.clone())
                .buckets(DURATION_BUCKETS.to_vec()),
        )?;
        let dns_cache_hits = IntCounter::with_opts(
            Opts::new("crawler_dns_cache_hits_total", "DNS cache hits").const_labels(labels.clone()),
        )?;
        let dns_cache_misses = IntCounter::with_opts(
            Opts::new("crawler_dns_cache_misses_total", "DNS cache misses").const_labels(labels.clone()),
        )?;
        let dns_cache_size = Gauge::with_opts(
            Opts::new("crawler_dns_cache_size", "Current DNS cache entries").const_labels(labels.clone()),
        )?;
        let fetch_success = IntCounter::with_opts(
            Opts::new("crawler_fetch_success_total", "Fetches with a 2xx status and no error")
                .const_labels(labels.clone()),
        )?;
        let fetch_failure = IntCounter::with_opts(
            Opts::new("crawler_fetch_failure_total", "Fetches that errored or returned non-2xx")
                .const_labels(labels),
        )?;

        registry.register(Box::new(pages_crawled.clone()))?;
        registry.register(Box::new(active_requests.clone()))?;
        registry.register(Box::new(queue_size.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(dns_cache_hits.clone()))?;
        registry.register(Box::new(dns_cache_misses.clone()))?;
        registry.register(Box::new(dns_cache_size.clone()))?;
        registry.register(Box::new(fetch_success.clone()))?;
        registry.register(Box::new(fetch_failure.clone()))?;

        Ok(Self {
            registry,
            pages_crawled,
            active_requests,
            queue_size,
            request_duration,
            dns_cache_hits,
            dns_cache_misses,
            dns_cache_size,
            fetch_success,
            fetch_failure,
        })
    }

    /// Renders the current snapshot in Prometheus text exposition format.
    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .expect("prometheus encoding cannot fail for well-formed metrics");
        String::from_utf8(buffer).expect("prometheus text encoder emits valid utf-8")
    }
}

fn const_labels(mode: &str, dns_cache: bool, workers: usize) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    labels.insert("mode".to_string(), mode.to_string());
    labels.insert(
        "dns_cache".to_string(),
        if dns_cache { "on" } else { "off" }.to_string(),
    );
    labels.insert("workers".to_string(), workers.to_string());
    labels
}

async fn metrics_handler(State(telemetry): State<Arc<Telemetry>>) -> String {
    telemetry.gather()
}

/// Binds the scrape endpoint's listening socket. Split out from `serve` so
/// the driver can treat a bind failure (e.g. the port already in use) as a
/// fatal setup error before it seeds the frontier or spawns any workers,
/// rather than discovering it only after the crawl has already run.
pub async fn bind(addr: SocketAddr) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind(addr).await
}

/// Serves the scrape endpoint on an already-bound `listener` until
/// `shutdown` fires.
pub async fn serve(
    telemetry: Arc<Telemetry>,
    listener: tokio::net::TcpListener,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(telemetry);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_registers_nine_metrics() {
        let telemetry = Telemetry::new("real", true, 20).unwrap();
        assert_eq!(telemetry.registry.gather().len(), 9);
    }

    #[test]
    fn gather_includes_metric_names() {
        let telemetry = Telemetry::new("simulation", false, 4).unwrap();
        telemetry.pages_crawled.inc();
        let text = telemetry.gather();
        assert!(text.contains("crawler_pages_crawled_total"));
        assert!(text.contains("mode=\"simulation\""));
        assert!(text.contains("dns_cache=\"off\""));
        assert!(text.contains("workers=\"4\""));
    }

    #[tokio::test]
    async fn bind_succeeds_on_an_ephemeral_port() {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = bind(addr).await.expect("bind should succeed on port 0");
        assert!(listener.local_addr().is_ok());
    }

    #[tokio::test]
    async fn serve_shuts_down_when_signaled() {
        let telemetry = Arc::new(Telemetry::new("real", false, 1).unwrap());
        let listener = bind(SocketAddr::from(([127, 0, 0, 1], 0))).await.unwrap();
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(serve(telemetry, listener, rx));
        tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("serve should shut down promptly once signaled")
            .unwrap()
            .unwrap();
    }
}
