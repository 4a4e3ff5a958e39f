//! CLI entry point for the steamshots tool.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use steamshots_core::{
    DetailResolver, Downloader, PageScraper, RetryPolicy, RetryingFetcher, progress_tag,
};
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let steam_id = match args.steam_id.clone() {
        Some(id) => id.trim().to_string(),
        None => prompt_steam_id()?,
    };
    if steam_id.is_empty() {
        bail!("no Steam ID provided");
    }

    let policy = RetryPolicy::new(args.max_attempts, Duration::from_secs(args.retry_delay));
    let fetcher = RetryingFetcher::new(policy)?;

    let scraper = PageScraper::new(fetcher.clone());
    let mut records = scraper.discover_all(&steam_id).await?;
    if records.is_empty() {
        info!("no screenshots found for {steam_id}");
        return Ok(());
    }

    info!("finding screenshot urls...");
    let resolver = DetailResolver::new(fetcher.clone()).anchor_index(args.anchor_index);
    let total = records.len();
    for (position, record) in records.iter_mut().enumerate() {
        let tag = progress_tag(position + 1, total);
        match resolver.resolve(record.file_id).await? {
            Some(url) => {
                debug!("{tag} found screenshot url for file id {}", record.file_id);
                record.resource_url = Some(url);
            }
            None => warn!("{tag} no screenshot url found for file id {}", record.file_id),
        }
    }

    let base_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&steam_id));
    info!("saving to {}", base_dir.display());

    let downloader = Downloader::new(fetcher);
    let stats = downloader.run(&base_dir, &mut records).await?;

    info!(
        saved = stats.saved,
        skipped = stats.skipped,
        total = stats.total,
        "download complete"
    );
    println!("\nDone! Processed {} screenshots.", stats.total);

    Ok(())
}

/// Reads the Steam id from stdin, prompting when attached to a terminal.
fn prompt_steam_id() -> Result<String> {
    if io::stdin().is_terminal() {
        print!("Enter Steam ID: ");
        io::stdout().flush()?;
    }
    let mut buffer = String::new();
    io::stdin().read_line(&mut buffer)?;
    Ok(buffer.trim().to_string())
}
