//! ripple-crawl entry point: wires CLI parsing, telemetry, the frontier, a
//! fetcher/extractor pair (real or simulated), the worker pool, and the
//! progress/shutdown lifecycle together.

use clap::Parser;
use ripple_crawl::config::{Cli, Config, SIMULATION_LINKS_MAX, SIMULATION_LINKS_MIN};
use ripple_crawl::dedup::{BloomDedup, DedupIndex, ExactDedup};
use ripple_crawl::dns::DnsResolver;
use ripple_crawl::extractor::{HtmlExtractor, LinkExtractor};
use ripple_crawl::fetcher::{Fetcher, RealFetcher, SimulatedFetcher};
use ripple_crawl::frontier::Frontier;
use ripple_crawl::pool::{PoolExtractor, UrlPool};
use ripple_crawl::progress::Progress;
use ripple_crawl::telemetry::{self, Telemetry};
use ripple_crawl::worker::run_workers;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

const DEDUP_CAPACITY: usize = 10_000_000;
const DEDUP_ERROR_RATE: f64 = 0.001;
const DNS_CACHE_CAPACITY: usize = 10_000;
const DNS_CACHE_TTL_SECS: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = Config::from_cli(&cli)?;
    tracing::info!(
        "starting crawl: mode={} workers={} max_pages={}",
        config.mode(),
        config.workers,
        config.max_pages
    );

    let telemetry = Arc::new(Telemetry::new(
        config.mode(),
        config.dns_cache,
        config.workers,
    )?);

    let dedup: Box<dyn DedupIndex> = if config.bloom {
        Box::new(BloomDedup::new(DEDUP_CAPACITY, DEDUP_ERROR_RATE))
    } else {
        Box::new(ExactDedup::new())
    };

    let frontier = Arc::new(Frontier::new(
        dedup,
        config.max_per_host,
        config.delay_per_host,
        telemetry.clone(),
    ));

    // DNS resolution always runs in simulation mode (it's what gives the
    // simulated fetcher its "real DNS pressure"); only the cache is gated
    // behind `--dns-cache`.
    let dns_resolver = config.simulation.then(|| {
        Arc::new(DnsResolver::new(
            config.dns_cache,
            DNS_CACHE_CAPACITY,
            std::time::Duration::from_secs(DNS_CACHE_TTL_SECS),
            telemetry.clone(),
        ))
    });

    let (fetcher, extractor): (Arc<dyn Fetcher>, Arc<dyn LinkExtractor>) = if config.simulation {
        let pool = UrlPool::load(&config.url_pool)?;
        tracing::info!(
            "loaded url pool: {} urls across {} hosts",
            pool.total(),
            pool.host_count()
        );
        let fetcher = Arc::new(SimulatedFetcher::new(config.delay_ms, dns_resolver));
        let extractor = Arc::new(PoolExtractor::new(
            pool,
            SIMULATION_LINKS_MIN,
            SIMULATION_LINKS_MAX,
        ));
        (fetcher, extractor)
    } else {
        let fetcher = Arc::new(RealFetcher::new(config.request_timeout)?);
        let extractor = Arc::new(HtmlExtractor);
        (fetcher, extractor)
    };

    let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let metrics_listener = telemetry::bind(metrics_addr).await.map_err(|e| {
        anyhow::anyhow!("failed to bind metrics scrape endpoint on {metrics_addr}: {e}")
    })?;

    for seed in &config.seeds {
        frontier.add(seed);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let progress = Arc::new(Progress::new(config.max_pages, shutdown_tx.clone()));

    let metrics_task = tokio::spawn(telemetry::serve(
        telemetry.clone(),
        metrics_listener,
        shutdown_rx.clone(),
    ));

    let worker_handles = run_workers(
        config.workers,
        frontier.clone(),
        fetcher,
        extractor,
        telemetry.clone(),
        progress.clone(),
        shutdown_rx.clone(),
    );

    wait_for_stop_signal(shutdown_tx).await;
    tracing::info!("shutdown signal received, draining workers");

    for handle in worker_handles {
        let _ = handle.await;
    }
    let _ = metrics_task.await;

    progress.summary();
    Ok(())
}

fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            _ => EnvFilter::new("ripple_crawl=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves once either external stop signal fires, or once `shutdown_tx`
/// has already been flipped by the progress observer reaching `max_pages`.
async fn wait_for_stop_signal(shutdown_tx: watch::Sender<bool>) {
    let mut rx = shutdown_tx.subscribe();
    if *rx.borrow() {
        return;
    }

    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut handler) => {
                handler.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { let _ = shutdown_tx.send(true); }
        _ = terminate => { let _ = shutdown_tx.send(true); }
        _ = rx.changed() => {}
    }
}
