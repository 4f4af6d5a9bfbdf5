use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

struct CacheEntry {
    ips: Vec<String>,
    inserted_at: Instant,
}

/// Bounded, TTL-expiring DNS cache. Eviction is insertion-order (oldest
/// inserted key evicted first) -- acceptable per the DNS resolver contract,
/// which only requires a bounded size, not true LRU.
pub struct DnsCache {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
    capacity: usize,
    ttl: Duration,
}

impl DnsCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Returns the cached IPs for `hostname` if present and not expired.
    pub fn get(&self, hostname: &str) -> Option<Vec<String>> {
        let entry = self.entries.get(hostname)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.ips.clone())
    }

    /// Inserts or refreshes `hostname`'s entry, evicting the oldest entry if
    /// the cache is at capacity.
    pub fn insert(&mut self, hostname: String, ips: Vec<String>) {
        if !self.entries.contains_key(&hostname) {
            self.order.push_back(hostname.clone());
        }

        self.entries.insert(
            hostname,
            CacheEntry {
                ips,
                inserted_at: Instant::now(),
            },
        );

        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
