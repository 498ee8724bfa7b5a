//! Error types for progress-dl
//!
//! Every failure of a download settles its outcome with one of these.

use std::fmt;
use std::path::PathBuf;

/// Main error type for progress-dl operations
#[derive(Debug)]
pub enum Error {
    /// Destination file already exists; downloads never overwrite
    AlreadyExists(PathBuf),

    /// URL cannot be turned into an output file path
    InvalidInput(String),

    /// HTTP-specific error (bad status, protocol failure, body error)
    HttpError(String),

    /// Network connectivity issues
    NetworkError(String),

    /// File I/O error while opening, writing or finalizing the output file
    IoError(std::io::Error),

    /// Transfer ended without a terminal event
    DownloadFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadyExists(path) => {
                write!(f, "output file {} already exists", path.display())
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
            Error::HttpError(msg) => {
                write!(f, "HTTP error: {}", msg)
            }
            Error::NetworkError(msg) => {
                write!(f, "Network error: {}", msg)
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
            Error::DownloadFailed(msg) => {
                write!(f, "Download failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Error::NetworkError(err.to_string())
        } else {
            Error::HttpError(err.to_string())
        }
    }
}

/// Convenience result type for progress-dl operations
pub type Result<T> = std::result::Result<T, Error>;
