mod config;
mod models;
mod processing;
mod scrapers;
mod summary;
mod table;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use config::Config;
use models::Operation;
use scrapers::{DetailExtractor, HttpFetcher, ListingCollector, StopReason};
use table::RawTable;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "pisos-scout", about = "Madrid property scraper and dataset cleaner for pisos.com")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Root directory for raw/ and processed/ data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect listing links, scrape every detail page, write the raw CSV
    Scrape {
        #[arg(short, long, value_enum)]
        operation: Option<Operation>,
        /// Stop the listing traversal after N pages
        #[arg(long)]
        max_pages: Option<u32>,
        /// Only scrape details for the first N properties
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Clean a raw CSV into the processed table
    Process {
        #[arg(short, long, value_enum)]
        operation: Option<Operation>,
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print aggregate statistics of a processed CSV
    Summary {
        #[arg(short, long, value_enum)]
        operation: Option<Operation>,
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Barrio rows to show
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.paths.data_dir = dir;
    }

    match cli.command {
        Commands::Scrape { operation, max_pages, limit } => {
            if let Some(op) = operation {
                config.scrape.operation = op;
            }
            config.scrape.max_pages = max_pages.or(config.scrape.max_pages);
            config.scrape.max_details = limit.or(config.scrape.max_details);
            run_scrape(&config).await?;
        }
        Commands::Process { operation, input, output } => {
            let op = operation.unwrap_or(config.scrape.operation);
            let input = input.unwrap_or_else(|| config.paths.raw_csv(op));
            let output = output.unwrap_or_else(|| config.paths.processed_csv(op));
            run_process(&input, &output)?;
        }
        Commands::Summary { operation, input, top } => {
            let op = operation.unwrap_or(config.scrape.operation);
            let input = input.unwrap_or_else(|| config.paths.processed_csv(op));
            let rows = processing::read_processed(&input)?;
            print!("{}", summary::render(&summary::summarize(&rows), top));
        }
    }

    info!("Done in {:.1}s", t0.elapsed().as_secs_f64());
    Ok(())
}

async fn run_scrape(config: &Config) -> anyhow::Result<()> {
    let params = &config.scrape;
    info!("🏠 pisos.com scraper ({} listings)", params.operation.slug());

    let fetcher = HttpFetcher::new(params)?;

    // Stage 1: listing pages
    let outcome = ListingCollector::new(&fetcher, params).collect().await;
    match &outcome.stop {
        StopReason::EmptyFirstPage => {
            bail!("No property links found on {}", params.listing_url())
        }
        StopReason::FetchFailed { .. } if outcome.stubs.is_empty() => {
            bail!("Listing collection failed: {}", outcome.stop)
        }
        stop if stop.is_failure() => {
            warn!("Listing collection stopped early ({}); continuing with partial results", stop)
        }
        _ => {}
    }

    let mut stubs = outcome.stubs;
    if let Some(limit) = params.max_details {
        stubs.truncate(limit);
        info!("Limiting detail scraping to {} properties", stubs.len());
    }

    // Stage 2: detail pages
    info!("Scraping details for {} properties...", stubs.len());
    let combined = DetailExtractor::new(&fetcher, params).scrape_all(stubs).await;

    let table = RawTable::from_records(&combined, params.operation.price_column());
    let path = config.paths.prepare_raw_output(params.operation);
    match table.write_csv(&path) {
        Ok(()) => info!("💾 Saved {} properties to {}", table.len(), path.display()),
        Err(e) => error!("Error saving raw table to {}: {:#}", path.display(), e),
    }
    Ok(())
}

fn run_process(input: &std::path::Path, output: &std::path::Path) -> anyhow::Result<()> {
    info!("Loading raw data from {}", input.display());
    let raw = RawTable::read_csv(input).context("Could not load the raw dataset")?;
    info!("Loaded {} rows x {} columns", raw.len(), raw.columns().len());
    if raw.is_empty() {
        warn!("{} has no rows", input.display());
    }
    if !raw.has_column("price_eur") && !raw.has_column("rent_eur_per_month") {
        warn!("{} has no price column; every row will be dropped", input.display());
    }

    let report = processing::clean(&raw);
    processing::write_processed(&report.rows, output)?;

    println!(
        "Processed {} of {} rows ({} without price dropped, {} columns discarded) -> {}",
        report.rows.len(),
        report.input_rows,
        report.dropped_without_price,
        report.discarded_columns.len(),
        output.display()
    );
    Ok(())
}
