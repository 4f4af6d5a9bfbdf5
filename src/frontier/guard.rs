use super::Frontier;
use std::sync::Arc;

/// RAII guard that calls `Frontier::release` exactly once, on every exit
/// path -- success, fetch error, or task cancellation. This is the scoped
/// resource release the design notes call for, implemented as a destructor
/// rather than relying on normal control flow.
pub struct HostGuard {
    frontier: Arc<Frontier>,
    host: String,
}

impl HostGuard {
    pub fn new(frontier: Arc<Frontier>, host: String) -> Self {
        Self { frontier, host }
    }
}

impl Drop for HostGuard {
    fn drop(&mut self) {
        self.frontier.release(&self.host);
    }
}
