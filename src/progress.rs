//! Progress observer: receives a `FetchRecord` per completed fetch, logs it,
//! counts completions, and signals shutdown once `max_pages` is reached.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{error, info};

/// Per-fetch outcome handed to the observer. Named to avoid colliding with
/// `crate::Result`, not because the domain calls it anything else.
#[derive(Debug, Clone)]
pub struct FetchRecord {
    pub url: String,
    pub host: String,
    pub status: u16,
    pub links: usize,
    pub duration: Duration,
    pub error: Option<String>,
}

/// Counts completions, logs one line per fetch, and flips the shutdown
/// watch channel to `true` once `max_pages` completions have been recorded.
/// Cheap to clone: the counter is shared via `Arc` internally through the
/// `watch` sender, and `Progress` itself is only ever held by one driver.
pub struct Progress {
    max_pages: usize,
    completed: AtomicUsize,
    started_at: Instant,
    shutdown_tx: watch::Sender<bool>,
}

impl Progress {
    pub fn new(max_pages: usize, shutdown_tx: watch::Sender<bool>) -> Self {
        Self {
            max_pages,
            completed: AtomicUsize::new(0),
            started_at: Instant::now(),
            shutdown_tx,
        }
    }

    /// Logs the record, bumps the completion count, and signals shutdown the
    /// first time the count reaches `max_pages`. Safe to call concurrently
    /// from every worker.
    pub fn record(&self, record: FetchRecord) {
        let count = self.completed.fetch_add(1, Ordering::SeqCst) + 1;

        match &record.error {
            None => info!(
                "[{count}] {} {} ({:.3}s, {} links)",
                record.status,
                record.url,
                record.duration.as_secs_f64(),
                record.links
            ),
            Some(message) => error!("[{count}] ERROR {}: {message}", record.url),
        }

        if count >= self.max_pages {
            let _ = self.shutdown_tx.send(true);
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Prints the exit summary: crawled count, elapsed time, QPS.
    pub fn summary(&self) {
        let elapsed = self.started_at.elapsed();
        let count = self.completed();
        let qps = if elapsed.as_secs_f64() > 0.0 {
            count as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        info!(
            "crawled {count} pages in {:.2}s ({qps:.1} pages/s)",
            elapsed.as_secs_f64()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(error: Option<&str>) -> FetchRecord {
        FetchRecord {
            url: "https://example.com/".to_string(),
            host: "example.com".to_string(),
            status: if error.is_some() { 0 } else { 200 },
            links: 0,
            duration: Duration::from_millis(1),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn signals_shutdown_at_max_pages() {
        let (tx, rx) = watch::channel(false);
        let progress = Progress::new(2, tx);

        progress.record(record(None));
        assert!(!*rx.borrow());

        progress.record(record(None));
        assert!(*rx.borrow());
    }

    #[test]
    fn counts_both_success_and_error_records() {
        let (tx, _rx) = watch::channel(false);
        let progress = Progress::new(10, tx);

        progress.record(record(None));
        progress.record(record(Some("boom")));

        assert_eq!(progress.completed(), 2);
    }

    #[test]
    fn shutdown_fires_exactly_once_at_threshold() {
        let (tx, mut rx) = watch::channel(false);
        let progress = Progress::new(1, tx);
        progress.record(record(None));

        assert!(rx.has_changed().unwrap());
        rx.mark_unchanged();
        progress.record(record(None));
        assert!(!rx.has_changed().unwrap());
    }
}
