//! Fetcher: one capability contract, two realizations (real HTTP and
//! simulated). Modeled as a trait so the worker pool never branches on mode
//! at the call site.

mod real;
mod simulated;

pub use real::RealFetcher;
pub use simulated::SimulatedFetcher;

use async_trait::async_trait;
use std::time::Duration;

/// Outcome of a single `fetch` call. `duration` is always the wall-clock
/// time spent, success or failure.
pub struct FetchOutcome {
    pub status: u16,
    pub body: String,
    pub duration: Duration,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Shared contract for real and simulated fetchers. `fetch` is the only
/// method the worker pool calls; resource acquisition/release is scoped to
/// the fetcher's own lifetime (RAII on the underlying HTTP client), not
/// exposed as separate open/close calls on this trait.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}
