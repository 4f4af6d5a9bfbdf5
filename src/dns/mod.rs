//! Asynchronous DNS resolution with an optional bounded TTL cache.
//!
//! Resolution is offloaded to `tokio::net::lookup_host`, which runs the
//! blocking `getaddrinfo` syscall on tokio's blocking thread pool -- this
//! satisfies the "non-blocking to the cooperative scheduler" requirement
//! without pulling in a dedicated async-DNS crate.

mod cache;

use crate::telemetry::Telemetry;
use cache::DnsCache;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::lookup_host;

pub struct DnsResolver {
    cache: Option<Mutex<DnsCache>>,
    telemetry: Arc<Telemetry>,
}

impl DnsResolver {
    /// `cache_capacity` and `ttl` are ignored when `use_cache` is false.
    pub fn new(
        use_cache: bool,
        cache_capacity: usize,
        ttl: Duration,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        Self {
            cache: use_cache.then(|| Mutex::new(DnsCache::new(cache_capacity, ttl))),
            telemetry,
        }
    }

    /// Resolves `hostname` to a list of IP strings. A failed resolution
    /// returns an empty list rather than propagating an error -- DNS failure
    /// in the simulated fetcher is best-effort and must not fail the fetch.
    pub async fn resolve(&self, hostname: &str) -> Vec<String> {
        if let Some(cache) = &self.cache {
            let hit = {
                let guard = cache.lock().expect("dns cache mutex poisoned");
                guard.get(hostname)
            };
            if let Some(ips) = hit {
                self.telemetry.dns_cache_hits.inc();
                return ips;
            }
            self.telemetry.dns_cache_misses.inc();
        }

        let ips = Self::do_resolve(hostname).await;

        if let Some(cache) = &self.cache {
            let mut guard = cache.lock().expect("dns cache mutex poisoned");
            guard.insert(hostname.to_string(), ips.clone());
            self.telemetry.dns_cache_size.set(guard.len() as f64);
        }

        ips
    }

    async fn do_resolve(hostname: &str) -> Vec<String> {
        // lookup_host requires a "host:port" pair; the port is discarded.
        match lookup_host((hostname, 0)).await {
            Ok(addrs) => addrs.map(|addr| addr.ip().to_string()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
