//! Core download functionality for progress-dl
//!
//! Streams one remote file into a new local file, reporting whole-number
//! percentages along the way.

use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use futures::stream::Peekable;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::io::AsyncWriteExt;

use crate::core::deferred::{deferred, Deferred, Download, Downloaded};
use crate::core::error::{Error, Result};
use crate::core::fs::{FileSystem, TokioFileSystem, WriteSink};
use crate::core::progress::TransferState;
use crate::core::source::DownloadRequest;
use crate::core::stream::{EventStream, HttpStreamFactory, ReqwestStreamFactory, StreamEvent};

/// Options for download operations
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Delete the partially written file when a download fails.
    ///
    /// Off by default: a failed download leaves whatever was written.
    pub remove_partial_on_failure: bool,
}

/// Downloads files through injected HTTP and filesystem capabilities
pub struct Downloader {
    http: Arc<dyn HttpStreamFactory>,
    fs: Arc<dyn FileSystem>,
    options: DownloadOptions,
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Downloader {
    /// Create a downloader using reqwest and tokio::fs
    pub fn new() -> Self {
        Self::with_collaborators(
            Arc::new(ReqwestStreamFactory::default()),
            Arc::new(TokioFileSystem),
        )
    }

    /// Create a downloader over custom HTTP and filesystem implementations
    pub fn with_collaborators(http: Arc<dyn HttpStreamFactory>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            http,
            fs,
            options: DownloadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DownloadOptions) -> Self {
        self.options = options;
        self
    }

    /// Download `url` into `output_dir`, naming the file after the URL path
    ///
    /// The output path is validated and checked for an existing file before
    /// this returns; a collision settles the result immediately without
    /// opening any stream. Otherwise the transfer runs on the current Tokio
    /// runtime, which must exist.
    pub fn download(&self, url: &str, output_dir: impl AsRef<Path>) -> Download {
        let (mut deferred, download) = deferred();

        let request = match DownloadRequest::new(url, output_dir.as_ref()) {
            Ok(request) => request,
            Err(e) => {
                deferred.reject(e);
                return download;
            }
        };

        if self.fs.exists(request.output_path()) {
            warn!("Refusing to overwrite {}", request.output_path().display());
            deferred.reject(Error::AlreadyExists(request.output_path().to_path_buf()));
            return download;
        }

        let transfer = Transfer {
            request,
            http: Arc::clone(&self.http),
            fs: Arc::clone(&self.fs),
            options: self.options.clone(),
        };
        tokio::spawn(transfer.run(deferred));

        download
    }
}

/// One in-flight download, owned by its task
struct Transfer {
    request: DownloadRequest,
    http: Arc<dyn HttpStreamFactory>,
    fs: Arc<dyn FileSystem>,
    options: DownloadOptions,
}

impl Transfer {
    async fn run(self, mut deferred: Deferred) {
        let path = self.request.output_path().to_path_buf();

        let mut sink = match self.fs.create_write_sink(&path).await {
            Ok(sink) => sink,
            Err(e) => {
                deferred.reject(e);
                return;
            }
        };
        debug!("Downloading {} to {}", self.request.url(), path.display());

        let result = self.pump(sink.as_mut(), &deferred).await;
        match result {
            Ok(state) => {
                info!(
                    "Downloaded {} bytes to {}",
                    state.downloaded(),
                    path.display()
                );
                deferred.resolve(Downloaded::new(path, sink));
            }
            Err(e) => {
                drop(sink);
                debug!("Download of {} failed: {e}", self.request.url());
                deferred.reject(e);

                if self.options.remove_partial_on_failure {
                    self.remove_partial(&path).await;
                }
            }
        }
    }

    /// Consume inbound events until the sink is finalized or the stream fails
    async fn pump(&self, sink: &mut dyn WriteSink, deferred: &Deferred) -> Result<TransferState> {
        let mut events = self.http.create_http_stream(self.request.url()).peekable();
        let mut state = TransferState::new();

        while let Some(event) = events.next().await {
            match event {
                StreamEvent::Meta(meta) => {
                    let length = meta.content_length();
                    if length.is_none() {
                        warn!(
                            "No usable content-length for {}, progress will not be meaningful",
                            self.request.url()
                        );
                    }
                    state.set_content_length(length);
                }
                StreamEvent::Data(chunk) => {
                    if let Some(percent) = state.record_chunk(chunk.len()) {
                        deferred.notify(percent);
                    }
                    self.write_chunk(sink, &chunk, &mut events).await?;
                }
                StreamEvent::End => {
                    // Completion is the sink finishing, not the network stream ending
                    sink.shutdown().await?;
                    return Ok(state);
                }
                StreamEvent::Error(e) => return Err(e),
            }
        }

        Err(Error::DownloadFailed(format!(
            "stream for {} ended before completion",
            self.request.url()
        )))
    }

    /// Write one chunk while watching the stream for a transport error
    ///
    /// A stream error fails the download even if the write never completes.
    /// At most one event is looked at ahead; anything other than an error
    /// stays queued until the write is done.
    async fn write_chunk(
        &self,
        sink: &mut dyn WriteSink,
        chunk: &[u8],
        events: &mut Peekable<EventStream>,
    ) -> Result<()> {
        let write = sink.write_all(chunk);
        tokio::pin!(write);
        let mut looked_ahead = false;

        loop {
            tokio::select! {
                biased;
                next = Pin::new(&mut *events).peek(), if !looked_ahead => {
                    let failed = matches!(next, Some(StreamEvent::Error(_)));
                    if failed {
                        if let Some(StreamEvent::Error(e)) = events.next().await {
                            return Err(e);
                        }
                    }
                    looked_ahead = true;
                }
                written = &mut write => return written.map_err(Into::into),
            }
        }
    }

    async fn remove_partial(&self, path: &Path) {
        match self.fs.remove_file(path).await {
            Ok(()) => debug!("Removed partial file {}", path.display()),
            Err(e) => warn!("Could not remove partial file {}: {e}", path.display()),
        }
    }
}
