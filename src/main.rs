mod cache;
mod constants;
mod dom;
mod error;
mod fetch;
mod modes;
mod output;
mod report;

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::cache::HttpCache;
use crate::constants::{CACHE_PATH, DOWNLOADS_DIR};
use crate::fetch::{CachedFetcher, HttpTransport};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "pydocs_scraper", about = "Python documentation scraper")]
struct Cli {
    /// Empty the persistent HTTP cache before the run
    #[arg(short = 'c', long)]
    clear_cache: bool,

    /// Where results go (default: plain rows on stdout)
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Release notes: article link, title, editors per release
    WhatsNew,
    /// Version list from the main page sidebar
    LatestVersions,
    /// Fetch the pdf-a4 documentation archive
    Download,
    /// PEP status reconciliation histogram
    Pep,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("Scraper started");
    let cli = Cli::parse();

    let cache = HttpCache::open(CACHE_PATH)?;
    let fetcher = CachedFetcher::new(HttpTransport::new()?, cache);
    if cli.clear_cache {
        let evicted = fetcher.cache().clear()?;
        info!("Cache cleared ({} responses dropped)", evicted);
    }

    match cli.command {
        Commands::WhatsNew => {
            if let Some(report) = modes::whats_new::collect(&fetcher)? {
                output::control_output(&report, "whats-new", cli.output)?;
            }
        }
        Commands::LatestVersions => {
            if let Some(report) = modes::latest_versions::collect(&fetcher)? {
                output::control_output(&report, "latest-versions", cli.output)?;
            }
        }
        Commands::Download => {
            if let Some(archive) = modes::download::collect(&fetcher)? {
                fs::create_dir_all(DOWNLOADS_DIR)?;
                let path = PathBuf::from(DOWNLOADS_DIR).join(&archive.filename);
                fs::write(&path, &archive.bytes)?;
                info!("Archive saved to {}", path.display());
            }
        }
        Commands::Pep => {
            if let Some(report) = modes::pep::collect(&fetcher)? {
                output::control_output(&report, "pep", cli.output)?;
            }
        }
    }

    info!("Scraper finished");
    Ok(())
}
