//! Sumi-Reach main entry point
//!
//! This is the command-line interface for the Sumi-Reach crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_reach::config::{read_config_with_hash, validate, Config, DepthBoundary};
use sumi_reach::crawler::Coordinator;
use sumi_reach::output::{print_report, sink_for};
use tracing_subscriber::EnvFilter;

/// Sumi-Reach: a bounded, concurrent web crawler
///
/// Starts from one or more seed URLs, follows links up to a maximum depth
/// with a fixed pool of workers, and saves every fetched page.
#[derive(Parser, Debug)]
#[command(name = "sumi-reach")]
#[command(version)]
#[command(about = "A bounded, concurrent web crawler", long_about = None)]
struct Cli {
    /// Seed URLs (replace any seeds from the config file)
    #[arg(value_name = "URL")]
    seeds: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of concurrent workers [default: 5]
    #[arg(short, long)]
    workers: Option<usize>,

    /// Maximum link depth from a seed [default: 3]
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Do not fetch pages sitting exactly at the maximum depth
    #[arg(long)]
    exclusive_depth: bool,

    /// Directory fetched pages are written to [default: .]
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Do not write fetched pages to disk
    #[arg(long)]
    no_save: bool,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds (transport default when unset)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and show it without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_reach=info,warn"),
            1 => EnvFilter::new("sumi_reach=debug,info"),
            2 => EnvFilter::new("sumi_reach=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Merges the optional config file with command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config_with_hash(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if !cli.seeds.is_empty() {
        config.seeds = cli.seeds.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawler.worker_count = workers;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if cli.exclusive_depth {
        config.crawler.depth_boundary = DepthBoundary::Exclusive;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.crawler.user_agent = user_agent.clone();
    }
    if cli.timeout.is_some() {
        config.crawler.request_timeout_secs = cli.timeout;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if cli.no_save {
        config.output.save_pages = false;
    }

    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Reach Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.worker_count);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Depth boundary: {:?}", config.crawler.depth_boundary);
    println!("  User agent: {}", config.crawler.user_agent);
    match config.crawler.request_timeout_secs {
        Some(secs) => println!("  Request timeout: {}s", secs),
        None => println!("  Request timeout: transport default"),
    }

    println!("\nOutput:");
    if config.output.save_pages {
        println!("  Directory: {}", config.output.directory);
    } else {
        println!("  Pages are not saved");
    }

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!("Total seed URLs: {}", config.seeds.len());

    let sink = sink_for(&config.output)?;
    let coordinator = Coordinator::new(config, sink)?;

    let stop = coordinator.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    match coordinator.run().await {
        Ok(report) => {
            if !report.stopped {
                tracing::info!("Crawling finished");
            }
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
