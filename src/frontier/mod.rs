//! The Frontier: the only admission, dispatch, and rate-limiting authority.
//! All four operations (`add`, `next`, `release`, snapshot) are linearizable
//! under a single mutex covering the per-host queues and counters. `next`
//! never suspends -- it is a fast scan over in-memory state, never held
//! across a suspension point.

mod guard;

pub use guard::HostGuard;

use crate::dedup::{AdmitOutcome, DedupIndex};
use crate::telemetry::Telemetry;
use crate::url_util;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

struct HostState {
    queue: VecDeque<String>,
    active: usize,
    last_access: Option<Instant>,
}

impl HostState {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            active: 0,
            last_access: None,
        }
    }
}

struct FrontierState {
    hosts: HashMap<String, HostState>,
    /// Insertion order of hosts, scanned round-robin from `rr_cursor` so that
    /// no eligible host is starved indefinitely.
    host_order: Vec<String>,
    rr_cursor: usize,
}

/// A point-in-time observability snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    pub queued: usize,
    pub active: usize,
    pub hosts: usize,
}

pub struct Frontier {
    state: Mutex<FrontierState>,
    dedup: Box<dyn DedupIndex>,
    max_per_host: usize,
    delay_per_host: Duration,
    telemetry: Arc<Telemetry>,
    capacity_warned: AtomicBool,
}

impl Frontier {
    pub fn new(
        dedup: Box<dyn DedupIndex>,
        max_per_host: usize,
        delay_per_host: Duration,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        Self {
            state: Mutex::new(FrontierState {
                hosts: HashMap::new(),
                host_order: Vec::new(),
                rr_cursor: 0,
            }),
            dedup,
            max_per_host,
            delay_per_host,
            telemetry,
            capacity_warned: AtomicBool::new(false),
        }
    }

    /// Strips the fragment, rejects non-http(s) schemes silently, and
    /// enqueues the URL on its host's queue unless it is already known. Does
    /// not suspend.
    pub fn add(&self, raw_url: &str) {
        let Some((url, host)) = url_util::admit(raw_url) else {
            return;
        };

        match self.dedup.add(&url) {
            AdmitOutcome::AlreadySeen => return,
            AdmitOutcome::AtCapacity => {
                if !self.capacity_warned.swap(true, Ordering::Relaxed) {
                    warn!("dedup index at capacity; dropping URL and all URLs hereafter that collide with a full slot");
                }
                return;
            }
            AdmitOutcome::Admitted => {}
        }

        let mut state = self.state.lock().expect("frontier mutex poisoned");
        if !state.hosts.contains_key(&host) {
            state.host_order.push(host.clone());
            state.hosts.insert(host.clone(), HostState::new());
        }
        state
            .hosts
            .get_mut(&host)
            .expect("host entry just inserted")
            .queue
            .push_back(url);

        self.telemetry.queue_size.inc();
    }

    /// Selects an eligible host (non-empty queue, `active < max_per_host`,
    /// `now - last_access >= delay_per_host`) and dispatches its head URL.
    /// Scans round-robin from the last dispatched host so repeated calls
    /// cannot starve an eligible host indefinitely. Does not suspend.
    pub fn next(&self) -> Option<(String, String)> {
        let mut state = self.state.lock().expect("frontier mutex poisoned");
        let n = state.host_order.len();
        if n == 0 {
            return None;
        }

        let now = Instant::now();
        let start = state.rr_cursor % n;

        for offset in 0..n {
            let idx = (start + offset) % n;
            let host = state.host_order[idx].clone();
            let host_state = state
                .hosts
                .get_mut(&host)
                .expect("host_order and hosts are kept in sync");

            if host_state.queue.is_empty() {
                continue;
            }
            if host_state.active >= self.max_per_host {
                continue;
            }
            if let Some(last) = host_state.last_access {
                if now.duration_since(last) < self.delay_per_host {
                    continue;
                }
            }

            let url = host_state
                .queue
                .pop_front()
                .expect("checked non-empty above");
            host_state.active += 1;
            host_state.last_access = Some(now);
            state.rr_cursor = (idx + 1) % n;

            self.telemetry.queue_size.dec();
            return Some((host, url));
        }

        None
    }

    /// Decrements `active` for `host`, saturating at zero. A host that is
    /// not tracked is a silent no-op (defensive against shutdown races).
    pub fn release(&self, host: &str) {
        let mut state = self.state.lock().expect("frontier mutex poisoned");
        if let Some(host_state) = state.hosts.get_mut(host) {
            host_state.active = host_state.active.saturating_sub(1);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().expect("frontier mutex poisoned");
        let queued = state.hosts.values().map(|h| h.queue.len()).sum();
        let active = state.hosts.values().map(|h| h.active).sum();
        Snapshot {
            queued,
            active,
            hosts: state.hosts.len(),
        }
    }
}
