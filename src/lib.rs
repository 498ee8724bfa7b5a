//! # Progress-dl Library
//!
//! Downloads a single remote file into a local directory and reports progress
//! as whole-number percentages of the bytes received.
//!
//! ## Features
//!
//! - **Never overwrites**: an existing destination fails the download before any request
//! - **Deduplicated progress**: percentages are strictly increasing, each reported once
//! - **Durable completion**: success is reported only after the file is flushed and closed
//! - **Injectable I/O**: HTTP and filesystem access sit behind traits
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Saved as ./downloads/archive.tar.gz
//!     let downloaded = progress_dl::download_with_progress(
//!         "https://example.com/files/archive.tar.gz",
//!         "./downloads",
//!         |percent| println!("{percent}%"),
//!     )
//!     .await?;
//!
//!     println!("Saved to {}", downloaded.path().display());
//!     Ok(())
//! }
//! ```
//!
//! ## Observing a Download
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut download = progress_dl::download("https://example.com/big.iso", "/tmp");
//!
//!     while let Some(percent) = download.progress().await {
//!         eprintln!("{percent}%");
//!     }
//!     let downloaded = download.outcome().await?;
//!     println!("{}", downloaded.path().display());
//!     Ok(())
//! }
//! ```

use std::path::Path;

// Re-export core types that users might need
pub use crate::core::error::{Error, Result};
pub use crate::core::fs::{FileSystem, TokioFileSystem, WriteSink};
pub use crate::core::progress::TransferState;
pub use crate::core::stream::{
    EventStream, HttpStreamFactory, ReqwestStreamFactory, ResponseMeta, StreamEvent,
};
pub use crate::core::{
    resolve_output_filename, Download, DownloadOptions, DownloadRequest, Downloaded, Downloader,
};

// Internal modules
mod core;

/// Start downloading `url` into `output_dir`
///
/// The file is named after the last segment of the URL path. The returned
/// [`Download`] yields progress notifications and then the outcome. Must be
/// called from within a Tokio runtime.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let download = progress_dl::download("https://example.com/data.csv", ".");
/// let downloaded = download.outcome().await?;
/// assert!(downloaded.path().ends_with("data.csv"));
/// # Ok(())
/// # }
/// ```
pub fn download(url: &str, output_dir: impl AsRef<Path>) -> Download {
    Downloader::new().download(url, output_dir)
}

/// Download with progress tracking
///
/// Calls `progress` with each new percentage, then returns the outcome.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// progress_dl::download_with_progress(
///     "https://example.com/files/archive.tar.gz",
///     "/tmp/out",
///     |percent| println!("Progress: {percent}%"),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn download_with_progress<F>(
    url: &str,
    output_dir: impl AsRef<Path>,
    progress: F,
) -> Result<Downloaded>
where
    F: FnMut(u64),
{
    download(url, output_dir).wait_with_progress(progress).await
}

/// Download with custom options
///
/// # Examples
/// ```rust,no_run
/// use progress_dl::DownloadOptions;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = DownloadOptions {
///     remove_partial_on_failure: true,
/// };
///
/// let download = progress_dl::download_with_options("https://example.com/big.iso", "/tmp", options);
/// download.outcome().await?;
/// # Ok(())
/// # }
/// ```
pub fn download_with_options(
    url: &str,
    output_dir: impl AsRef<Path>,
    options: DownloadOptions,
) -> Download {
    Downloader::new()
        .with_options(options)
        .download(url, output_dir)
}
