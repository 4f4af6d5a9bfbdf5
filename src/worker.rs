//! Worker pool: N identical, stateless tasks draining the frontier. Each
//! loop iteration is pull → fetch → extract → feed back → release → report,
//! exactly the cycle in the component design notes.

use crate::extractor::LinkExtractor;
use crate::fetcher::Fetcher;
use crate::frontier::{Frontier, HostGuard};
use crate::progress::{FetchRecord, Progress};
use crate::telemetry::Telemetry;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Spawns `count` worker tasks, each running `worker_loop` until `shutdown`
/// fires. Returns their join handles so the driver can await them.
pub fn run_workers(
    count: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    telemetry: Arc<Telemetry>,
    progress: Arc<Progress>,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|_| {
            let frontier = frontier.clone();
            let fetcher = fetcher.clone();
            let extractor = extractor.clone();
            let telemetry = telemetry.clone();
            let progress = progress.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(worker_loop(
                frontier, fetcher, extractor, telemetry, progress, shutdown,
            ))
        })
        .collect()
}

/// A worker checks `shutdown` at the top of every iteration and again right
/// after an empty `next()`, so it never starts fetching after a shutdown
/// signal and never blocks shutdown on an empty-frontier poll.
async fn worker_loop(
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    telemetry: Arc<Telemetry>,
    progress: Arc<Progress>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            return;
        }

        let Some((host, url)) = frontier.next() else {
            let backoff = Duration::from_millis(rand::thread_rng().gen_range(10..=100));
            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = shutdown.changed() => {}
            }
            continue;
        };

        if *shutdown.borrow() {
            frontier.release(&host);
            return;
        }

        let record = run_one(&frontier, &*fetcher, &*extractor, &telemetry, host, url).await;
        progress.record(record);
    }
}

/// Runs a single fetch-extract-feedback cycle for work already dequeued from
/// the frontier. The `HostGuard` releases the host on every exit path,
/// including the early returns a fetch error would otherwise bypass.
async fn run_one(
    frontier: &Arc<Frontier>,
    fetcher: &dyn Fetcher,
    extractor: &dyn LinkExtractor,
    telemetry: &Telemetry,
    host: String,
    url: String,
) -> FetchRecord {
    let guard = HostGuard::new(frontier.clone(), host.clone());

    telemetry.active_requests.inc();
    let outcome = fetcher.fetch(&url).await;
    telemetry.active_requests.dec();

    telemetry.request_duration.observe(outcome.duration.as_secs_f64());
    telemetry.pages_crawled.inc();

    let links = if outcome.is_success() {
        telemetry.fetch_success.inc();
        if outcome.status == 200 {
            extractor.extract(&outcome.body, &url)
        } else {
            Vec::new()
        }
    } else {
        telemetry.fetch_failure.inc();
        Vec::new()
    };

    for link in &links {
        frontier.add(link);
    }

    drop(guard);

    FetchRecord {
        url,
        host,
        status: outcome.status,
        links: links.len(),
        duration: outcome.duration,
        error: outcome.error,
    }
}
