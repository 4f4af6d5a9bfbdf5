//! URL pool: a static, pre-collected mapping of host -> path list used by
//! the simulated fetcher to manufacture "discovered" links without a real
//! HTML parse.

use crate::CrawlError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct UrlPoolFile {
    total: usize,
    #[allow(dead_code)]
    hosts: usize,
    urls_by_host: HashMap<String, Vec<String>>,
}

/// Immutable after load. `all_hosts` is cached up front so sampling a host
/// uniformly at random is O(1).
pub struct UrlPool {
    urls_by_host: HashMap<String, Vec<String>>,
    all_hosts: Vec<String>,
    total: usize,
}

impl UrlPool {
    /// Loads a pool from the JSON document described in the URL-pool file
    /// format. A missing file is a setup-time fatal error directing the user
    /// to generate one.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        if !path.exists() {
            return Err(CrawlError::Setup(format!(
                "URL pool file not found: {}. Generate one with a URL collector before running \
                 in --simulation mode.",
                path.display()
            )));
        }

        let raw = std::fs::read_to_string(path)?;
        let parsed: UrlPoolFile = serde_json::from_str(&raw)?;

        if parsed.urls_by_host.is_empty() {
            return Err(CrawlError::Setup(format!(
                "URL pool is empty: {}",
                path.display()
            )));
        }

        let all_hosts: Vec<String> = parsed.urls_by_host.keys().cloned().collect();

        Ok(Self {
            urls_by_host: parsed.urls_by_host,
            all_hosts,
            total: parsed.total,
        })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn host_count(&self) -> usize {
        self.all_hosts.len()
    }

    /// Draws `n` URLs: for each, picks a host uniformly at random, then a
    /// path uniformly at random from that host's paths, and concatenates as
    /// `"https://" + host + path`. A host with no paths contributes nothing
    /// for that iteration, so the result may have fewer than `n` entries.
    pub fn get_random_links(&self, n: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let mut links = Vec::with_capacity(n);

        for _ in 0..n {
            let Some(host) = self.all_hosts.choose(&mut rng) else {
                break;
            };
            let paths = &self.urls_by_host[host];
            if let Some(path) = paths.choose(&mut rng) {
                links.push(format!("https://{host}{path}"));
            }
        }

        links
    }

    /// Draws a random count of links in `[min, max]` (inclusive), matching
    /// the original implementation's `simulation_links_min`/`_max` knobs.
    pub fn get_random_links_range(&self, min: usize, max: usize) -> Vec<String> {
        let n = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        self.get_random_links(n)
    }
}

/// Simulation's stand-in for `HtmlExtractor`: instead of parsing a (fake,
/// empty) body, it samples fresh links from the static pool so the frontier
/// still sees a realistic stream of discovered URLs.
pub struct PoolExtractor {
    pool: UrlPool,
    links_min: usize,
    links_max: usize,
}

impl PoolExtractor {
    pub fn new(pool: UrlPool, links_min: usize, links_max: usize) -> Self {
        Self {
            pool,
            links_min,
            links_max,
        }
    }
}

impl crate::extractor::LinkExtractor for PoolExtractor {
    fn extract(&self, _body: &str, _url: &str) -> Vec<String> {
        self.pool.get_random_links_range(self.links_min, self.links_max)
    }
}
