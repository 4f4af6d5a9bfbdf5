//! ripple-crawl: a polite, high-concurrency web crawler control plane.
//!
//! This crate implements the frontier (dedup + per-host queues + per-host
//! rate limiting), the worker pool that drains it, and the fetcher/DNS/pool
//! substrate needed to exercise the control plane with either real HTTP or a
//! reproducible simulation.

pub mod config;
pub mod dedup;
pub mod dns;
pub mod extractor;
pub mod fetcher;
pub mod frontier;
pub mod pool;
pub mod progress;
pub mod telemetry;
pub mod url_util;
pub mod worker;

use thiserror::Error;

/// Top-level error type for fallible, process-ending operations (CLI parsing,
/// config validation, pool loading, metrics server bind). Per-fetch failures
/// never become a `CrawlError` -- they are folded into `FetchRecord.error`
/// instead, per the error propagation policy in the design notes.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("setup error: {0}")]
    Setup(String),

    #[error("invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
