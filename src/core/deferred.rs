//! Single-settlement download results
//!
//! A [`Download`] is handed to the caller immediately. The task driving the
//! transfer keeps the matching [`Deferred`], pushes progress through it and
//! settles it exactly once.

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use tokio::sync::{mpsc, oneshot};

use crate::core::error::{Error, Result};
use crate::core::fs::WriteSink;

/// A completed download: where it was written and the finalized file handle
pub struct Downloaded {
    path: PathBuf,
    file: Box<dyn WriteSink>,
}

impl Downloaded {
    pub(crate) fn new(path: PathBuf, file: Box<dyn WriteSink>) -> Self {
        Self { path, file }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The output file handle, already flushed and shut down for writing
    pub fn into_file(self) -> Box<dyn WriteSink> {
        self.file
    }

    pub fn into_parts(self) -> (PathBuf, Box<dyn WriteSink>) {
        (self.path, self.file)
    }
}

impl fmt::Debug for Downloaded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloaded")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Create a linked producer/observer pair
pub(crate) fn deferred() -> (Deferred, Download) {
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = oneshot::channel();

    (
        Deferred {
            progress: Some(progress_tx),
            outcome: Some(outcome_tx),
            settled: false,
        },
        Download {
            progress: progress_rx,
            outcome: Some(outcome_rx),
            settled: None,
        },
    )
}

/// Producer side of a download result
pub(crate) struct Deferred {
    progress: Option<mpsc::UnboundedSender<u64>>,
    outcome: Option<oneshot::Sender<Result<Downloaded>>>,
    settled: bool,
}

impl Deferred {
    /// Emit a progress notification; ignored once settled
    pub(crate) fn notify(&self, percent: u64) {
        if self.settled {
            return;
        }
        if let Some(progress) = &self.progress {
            // The observer may have stopped listening; that is not an error
            let _ = progress.send(percent);
        }
    }

    pub(crate) fn resolve(&mut self, downloaded: Downloaded) -> bool {
        self.settle(Ok(downloaded))
    }

    pub(crate) fn reject(&mut self, error: Error) -> bool {
        self.settle(Err(error))
    }

    /// Deliver the outcome; returns false if it was already delivered
    fn settle(&mut self, outcome: Result<Downloaded>) -> bool {
        if self.settled {
            debug!("Ignoring repeated settlement: {:?}", outcome.as_ref().err());
            return false;
        }
        self.settled = true;

        // Closing the channel tells observers no more progress is coming
        self.progress = None;

        if let Some(sender) = self.outcome.take() {
            let _ = sender.send(outcome);
        }
        true
    }
}

/// Observer side of a download: progress notifications and the final outcome
pub struct Download {
    progress: mpsc::UnboundedReceiver<u64>,
    outcome: Option<oneshot::Receiver<Result<Downloaded>>>,
    settled: Option<Result<Downloaded>>,
}

impl Download {
    /// Next progress notification
    ///
    /// Returns `None` once the download has settled and every notification
    /// sent before settlement has been read.
    pub async fn progress(&mut self) -> Option<u64> {
        self.progress.recv().await
    }

    /// Whether the outcome has been delivered, without consuming it
    pub fn is_settled(&mut self) -> bool {
        if self.settled.is_some() {
            return true;
        }
        let Some(receiver) = self.outcome.as_mut() else {
            return false;
        };
        match receiver.try_recv() {
            Ok(outcome) => {
                self.settled = Some(outcome);
                self.outcome = None;
                true
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.settled = Some(Err(unsettled()));
                self.outcome = None;
                true
            }
        }
    }

    /// Wait for the outcome
    pub async fn outcome(mut self) -> Result<Downloaded> {
        if let Some(outcome) = self.settled.take() {
            return outcome;
        }
        match self.outcome.take() {
            Some(receiver) => receiver.await.unwrap_or_else(|_| Err(unsettled())),
            None => Err(unsettled()),
        }
    }

    /// Feed every progress notification to `on_progress`, then return the outcome
    pub async fn wait_with_progress<F>(mut self, mut on_progress: F) -> Result<Downloaded>
    where
        F: FnMut(u64),
    {
        while let Some(percent) = self.progress().await {
            on_progress(percent);
        }
        self.outcome().await
    }
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Download")
            .field("settled", &self.settled.is_some())
            .finish_non_exhaustive()
    }
}

fn unsettled() -> Error {
    Error::DownloadFailed("download ended without an outcome".to_string())
}
