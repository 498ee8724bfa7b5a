//! Transfer bookkeeping for a single download
//!
//! Tracks bytes received against the announced content length and decides
//! when a new percentage is worth reporting.

/// Denominator used until (or unless) the content length is known
pub const UNKNOWN_CONTENT_LENGTH: u64 = 1;

/// Per-download progress state
///
/// Percentages are `floor(downloaded * 100 / content_length)`. They are only
/// reported when they exceed the last reported value, so notifications are
/// strictly increasing. With an unknown length the denominator stays at 1
/// and the values are not meaningful, but they are still computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferState {
    content_length: u64,
    downloaded: u64,
    last_notified_percent: u64,
}

impl Default for TransferState {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferState {
    pub fn new() -> Self {
        Self {
            content_length: UNKNOWN_CONTENT_LENGTH,
            downloaded: 0,
            last_notified_percent: 0,
        }
    }

    /// Record the announced size; zero or unknown keeps the sentinel
    pub fn set_content_length(&mut self, length: Option<u64>) {
        self.content_length = length
            .filter(|&len| len > 0)
            .unwrap_or(UNKNOWN_CONTENT_LENGTH);
    }

    /// Account for a received chunk
    ///
    /// Returns the percentage to report, if it moved past the last one.
    pub fn record_chunk(&mut self, len: usize) -> Option<u64> {
        self.downloaded = self.downloaded.saturating_add(len as u64);

        let percent = self.downloaded.saturating_mul(100) / self.content_length;
        if percent > self.last_notified_percent {
            self.last_notified_percent = percent;
            Some(percent)
        } else {
            None
        }
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }

    pub fn last_notified_percent(&self) -> u64 {
        self.last_notified_percent
    }
}
