//! Filesystem capability for progress-dl
//!
//! Provides the existence check and the write sinks downloads stream into.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::core::error::{Error, Result};

/// Destination for downloaded bytes
///
/// Finalizing a sink is `AsyncWriteExt::shutdown`; its completion means all
/// bytes have been handed to storage.
pub trait WriteSink: AsyncWrite + Send + Unpin {}

impl<T: AsyncWrite + Send + Unpin> WriteSink for T {}

/// Capability to inspect and write the local filesystem
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Whether anything exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Create a new file at `path` and return a sink writing into it
    async fn create_write_sink(&self, path: &Path) -> Result<Box<dyn WriteSink>>;

    /// Remove the file at `path`
    async fn remove_file(&self, path: &Path) -> Result<()>;
}

/// Default filesystem backed by tokio::fs
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn create_write_sink(&self, path: &Path) -> Result<Box<dyn WriteSink>> {
        // create_new keeps the no-overwrite guarantee if a file appears after the check
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(path.to_path_buf()),
                _ => Error::IoError(e),
            })?;
        Ok(Box::new(file))
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path).await.map_err(Into::into)
    }
}
