//! # Progress-dl CLI
//!
//! Command-line interface for the progress-dl library.
//! Downloads one file into a directory while drawing a percentage bar.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, error};
use progress_dl::{DownloadOptions, Downloader, Result};

mod cli;

/// Command-line interface for progress-dl
#[derive(Parser)]
#[command(name = "progress-dl")]
#[command(about = "Download a file into a directory with percentage progress")]
#[command(long_about = "Downloads a single file, named after the last segment of its URL path:
  progress-dl https://example.com/files/archive.tar.gz          # Saves ./archive.tar.gz
  progress-dl https://example.com/files/archive.tar.gz /tmp/out # Saves /tmp/out/archive.tar.gz

Existing files are never overwritten; the download fails instead.")]
#[command(version)]
struct Cli {
    /// URL of the file to download
    url: String,

    /// Directory to save the file into
    #[arg(default_value = ".")]
    output_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Delete the partially written file if the download fails
    #[arg(long)]
    remove_partial: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    debug!("progress-dl v{} starting...", env!("CARGO_PKG_VERSION"));

    let options = DownloadOptions {
        remove_partial_on_failure: cli.remove_partial,
    };
    let download = Downloader::new()
        .with_options(options)
        .download(&cli.url, &cli.output_dir);

    let progress_manager = cli::ProgressManager::new(&format!("🌐 Downloading {}", cli.url));
    let result = download
        .wait_with_progress(|percent| progress_manager.update(percent))
        .await;

    match result {
        Ok(downloaded) => {
            progress_manager.finish("✅ Download completed!");
            eprintln!("📁 Saved to: {}", downloaded.path().display());
            Ok(())
        }
        Err(e) => {
            progress_manager.abandon();
            Err(e)
        }
    }
}
