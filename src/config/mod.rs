//! Command-line surface and the crawl configuration it produces.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Seed URLs used when `--seeds` is not given, ported from the original
/// crawler's default configuration.
pub const DEFAULT_SEEDS: &[&str] = &[
    "https://go.dev/",
    "https://pkg.go.dev/",
    "https://docs.python.org/",
    "https://docs.github.com/",
    "https://nodejs.org/docs/",
    "https://developer.mozilla.org/",
    "https://docs.docker.com/",
    "https://kubernetes.io/docs/",
    "https://www.rust-lang.org/",
    "https://docs.rs/",
    "https://docs.oracle.com/",
    "https://docs.aws.amazon.com/",
    "https://cloud.google.com/docs/",
    "https://learn.microsoft.com/",
    "https://wiki.archlinux.org/",
    "https://wiki.debian.org/",
    "https://docs.fedoraproject.org/",
    "https://doc.rust-lang.org/",
    "https://ruby-doc.org/",
    "https://docs.julialang.org/",
    "https://github.com/",
    "https://gitlab.com/",
    "https://bitbucket.org/",
    "https://sourceforge.net/",
    "https://codeberg.org/",
    "https://news.ycombinator.com/",
    "https://lobste.rs/",
    "https://slashdot.org/",
    "https://arstechnica.com/",
    "https://techcrunch.com/",
    "https://en.wikipedia.org/",
    "https://en.wikibooks.org/",
    "https://www.britannica.com/",
    "https://arxiv.org/",
    "https://www.nature.com/",
    "https://www.sciencedirect.com/",
    "https://stackoverflow.com/",
    "https://www.w3schools.com/",
    "https://www.tutorialspoint.com/",
    "https://www.geeksforgeeks.org/",
    "https://realpython.com/",
    "https://www.freecodecamp.org/",
    "https://css-tricks.com/",
    "https://smashingmagazine.com/",
    "https://dev.to/",
    "https://hashnode.com/",
    "https://dzone.com/",
    "https://infoq.com/",
    "https://martinfowler.com/",
];

/// Simulation mode samples between 5 and 20 links per fetch, matching the
/// original implementation's `simulation_links_min`/`simulation_links_max`.
pub const SIMULATION_LINKS_MIN: usize = 5;
pub const SIMULATION_LINKS_MAX: usize = 20;

#[derive(Parser, Debug)]
#[command(name = "ripple-crawl", about = "A polite, high-concurrency web crawler")]
pub struct Cli {
    /// Stop after this many completed fetches.
    #[arg(long, default_value_t = 30_000)]
    pub max_pages: usize,

    /// Number of concurrent worker tasks.
    #[arg(long, default_value_t = 20)]
    pub workers: usize,

    /// Maximum simultaneously in-flight requests per host.
    #[arg(long, default_value_t = 10)]
    pub max_per_host: usize,

    /// Minimum seconds between successive dispatches to the same host.
    #[arg(long, default_value_t = 0.5)]
    pub delay_per_host: f64,

    /// Use the simulated fetcher and URL pool instead of real HTTP.
    #[arg(long, default_value_t = false)]
    pub simulation: bool,

    /// Simulated fetch delay in milliseconds.
    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    /// Path to the URL pool JSON file (simulation mode only).
    #[arg(long, default_value = "url_pool.json")]
    pub url_pool: PathBuf,

    /// Use the approximate (bloom filter) dedup backend instead of exact.
    #[arg(long, default_value_t = false)]
    pub bloom: bool,

    /// Enable the DNS resolution cache.
    #[arg(long, default_value_t = false)]
    pub dns_cache: bool,

    /// Optional newline-delimited seed URL file. Falls back to the built-in
    /// default seed list when omitted.
    #[arg(long)]
    pub seeds: Option<PathBuf>,

    /// Total per-request timeout in seconds (real fetcher only).
    #[arg(long, default_value_t = 10.0)]
    pub request_timeout: f64,

    /// Port the Prometheus scrape endpoint listens on.
    #[arg(long, default_value_t = 9090)]
    pub metrics_port: u16,

    /// Increase log verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all but warning/error logs.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Fully resolved run configuration, derived from `Cli` plus the seed list
/// loaded from disk or the built-in default.
pub struct Config {
    pub max_pages: usize,
    pub workers: usize,
    pub max_per_host: usize,
    pub delay_per_host: Duration,
    pub simulation: bool,
    pub delay_ms: u64,
    pub url_pool: PathBuf,
    pub bloom: bool,
    pub dns_cache: bool,
    pub seeds: Vec<String>,
    pub request_timeout: Duration,
    pub metrics_port: u16,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> crate::Result<Self> {
        let seeds = match &cli.seeds {
            Some(path) => load_seed_file(path)?,
            None => DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            max_pages: cli.max_pages,
            workers: cli.workers,
            max_per_host: cli.max_per_host,
            delay_per_host: Duration::from_secs_f64(cli.delay_per_host),
            simulation: cli.simulation,
            delay_ms: cli.delay_ms,
            url_pool: cli.url_pool.clone(),
            bloom: cli.bloom,
            dns_cache: cli.dns_cache,
            seeds,
            request_timeout: Duration::from_secs_f64(cli.request_timeout),
            metrics_port: cli.metrics_port,
        })
    }

    /// Telemetry's `mode` label.
    pub fn mode(&self) -> &'static str {
        if self.simulation {
            "simulation"
        } else {
            "real"
        }
    }
}

fn load_seed_file(path: &std::path::Path) -> crate::Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)?;
    let seeds: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if seeds.is_empty() {
        return Err(crate::CrawlError::Setup(format!(
            "seed file {} contains no URLs",
            path.display()
        )));
    }

    Ok(seeds)
}
