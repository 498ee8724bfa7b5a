//! Output path resolution for progress-dl
//!
//! A download lands in the output directory under the last segment of the
//! URL path.

use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::core::error::{Error, Result};

/// A validated download request with its derived output path
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    url: String,
    output_path: PathBuf,
}

impl DownloadRequest {
    /// Build a request, deriving `output_dir/<basename of url path>`
    pub fn new(url: &str, output_dir: &Path) -> Result<Self> {
        let filename = resolve_output_filename(url)?;
        Ok(Self {
            url: url.to_string(),
            output_path: output_dir.join(filename),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

/// Extracts the final path segment of a URL, ignoring query and fragment
pub fn resolve_output_filename(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidInput(format!("{url}: {e}")))?;

    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    if name.is_empty() {
        return Err(Error::InvalidInput(format!(
            "{url}: URL path has no file name"
        )));
    }

    Ok(name.to_string())
}
