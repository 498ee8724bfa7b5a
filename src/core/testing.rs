//! In-memory collaborators for exercising the downloader without I/O

use std::collections::HashSet;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tokio::io::AsyncWrite;
use tokio::sync::{oneshot, Notify};

use crate::core::error::{Error, Result};
use crate::core::fs::{FileSystem, WriteSink};
use crate::core::stream::{EventStream, HttpStreamFactory, StreamEvent};

/// A data event carrying `len` zero bytes
pub(crate) fn data(len: usize) -> StreamEvent {
    StreamEvent::Data(Bytes::from(vec![0u8; len]))
}

/// Replays a fixed event script and records every URL it was asked for
pub(crate) struct ScriptedHttp {
    events: Mutex<Option<Vec<StreamEvent>>>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedHttp {
    pub(crate) fn new(events: Vec<StreamEvent>) -> Self {
        Self {
            events: Mutex::new(Some(events)),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub(crate) fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl HttpStreamFactory for ScriptedHttp {
    fn create_http_stream(&self, url: &str) -> EventStream {
        self.urls.lock().unwrap().push(url.to_string());
        let events = self.events.lock().unwrap().take().unwrap_or_default();
        stream::iter(events).boxed()
    }
}

/// Filesystem whose sinks write into a shared buffer
pub(crate) struct MemoryFileSystem {
    existing: Mutex<HashSet<PathBuf>>,
    written: Arc<Mutex<Vec<u8>>>,
    finalized: Arc<AtomicBool>,
    shutdown_started: Arc<Notify>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    fail_open: bool,
    fail_writes: bool,
    stall_writes: bool,
    fail_shutdown: bool,
    sinks_created: AtomicUsize,
    removed: Mutex<Vec<PathBuf>>,
}

impl MemoryFileSystem {
    pub(crate) fn new() -> Self {
        Self {
            existing: Mutex::new(HashSet::new()),
            written: Arc::new(Mutex::new(Vec::new())),
            finalized: Arc::new(AtomicBool::new(false)),
            shutdown_started: Arc::new(Notify::new()),
            gate: Mutex::new(None),
            fail_open: false,
            fail_writes: false,
            stall_writes: false,
            fail_shutdown: false,
            sinks_created: AtomicUsize::new(0),
            removed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_existing(path: impl Into<PathBuf>) -> Self {
        let fs = Self::new();
        fs.existing.lock().unwrap().insert(path.into());
        fs
    }

    /// Sinks hold `shutdown` pending until the returned sender fires
    pub(crate) fn gated() -> (Self, oneshot::Sender<()>) {
        let (release, gate) = oneshot::channel();
        let fs = Self::new();
        *fs.gate.lock().unwrap() = Some(gate);
        (fs, release)
    }

    pub(crate) fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    /// Sinks whose writes never complete
    pub(crate) fn stalled_writes() -> Self {
        Self {
            stall_writes: true,
            ..Self::new()
        }
    }

    pub(crate) fn failing_shutdown() -> Self {
        Self {
            fail_shutdown: true,
            ..Self::new()
        }
    }

    pub(crate) fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::new()
        }
    }

    pub(crate) fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    pub(crate) fn finalized(&self) -> bool {
        self.finalized.load(Ordering::SeqCst)
    }

    pub(crate) fn sinks_created(&self) -> usize {
        self.sinks_created.load(Ordering::SeqCst)
    }

    pub(crate) fn removed(&self) -> Vec<PathBuf> {
        self.removed.lock().unwrap().clone()
    }

    pub(crate) async fn wait_for_shutdown_started(&self) {
        self.shutdown_started.notified().await;
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.existing.lock().unwrap().contains(path)
    }

    async fn create_write_sink(&self, path: &Path) -> Result<Box<dyn WriteSink>> {
        if self.fail_open {
            return Err(Error::IoError(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only filesystem",
            )));
        }
        self.sinks_created.fetch_add(1, Ordering::SeqCst);
        self.existing.lock().unwrap().insert(path.to_path_buf());

        Ok(Box::new(MemorySink {
            written: Arc::clone(&self.written),
            finalized: Arc::clone(&self.finalized),
            shutdown_started: Arc::clone(&self.shutdown_started),
            gate: self.gate.lock().unwrap().take(),
            fail_writes: self.fail_writes,
            stall_writes: self.stall_writes,
            fail_shutdown: self.fail_shutdown,
            shutdown_signalled: false,
        }))
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        self.existing.lock().unwrap().remove(path);
        self.removed.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

struct MemorySink {
    written: Arc<Mutex<Vec<u8>>>,
    finalized: Arc<AtomicBool>,
    shutdown_started: Arc<Notify>,
    gate: Option<oneshot::Receiver<()>>,
    fail_writes: bool,
    stall_writes: bool,
    fail_shutdown: bool,
    shutdown_signalled: bool,
}

impl AsyncWrite for MemorySink {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.fail_writes {
            return Poll::Ready(Err(io::Error::other("disk full")));
        }
        if self.stall_writes {
            return Poll::Pending;
        }
        self.written.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if !this.shutdown_signalled {
            this.shutdown_signalled = true;
            this.shutdown_started.notify_one();
        }
        if let Some(gate) = this.gate.as_mut() {
            if Pin::new(gate).poll(cx).is_pending() {
                return Poll::Pending;
            }
            this.gate = None;
        }
        if this.fail_shutdown {
            return Poll::Ready(Err(io::Error::other("flush failed")));
        }
        this.finalized.store(true, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}
