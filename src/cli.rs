//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use steamshots_core::DEFAULT_ANCHOR_INDEX;
use steamshots_core::fetch::DEFAULT_MAX_ATTEMPTS;

/// Batch download a Steam user's public screenshot gallery.
///
/// Walks the paginated screenshot grid, resolves each entry to the
/// full-size image, and saves everything under one output directory.
#[derive(Parser, Debug)]
#[command(name = "steamshots")]
#[command(author, version, about)]
pub struct Args {
    /// Steam community id (the vanity name from the profile URL).
    /// Prompted for interactively when omitted.
    pub steam_id: Option<String>,

    /// Directory to save screenshots into (default: ./<steam-id>)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum fetch attempts per request (1-100)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_attempts: u32,

    /// Seconds to wait between failed fetch attempts
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(0..=600))]
    pub retry_delay: u64,

    /// Which matched detail-page anchor holds the image URL (0-based)
    #[arg(long, default_value_t = DEFAULT_ANCHOR_INDEX)]
    pub anchor_index: usize,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
