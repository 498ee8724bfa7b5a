//! Core library modules for progress-dl
//!
//! This module contains the internal implementation details of the progress-dl library.

pub mod deferred;
pub mod downloader;
pub mod error;
pub mod fs;
pub mod progress;
pub mod source;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for internal use
pub use deferred::{Download, Downloaded};
pub use downloader::{DownloadOptions, Downloader};
pub use source::{resolve_output_filename, DownloadRequest};
