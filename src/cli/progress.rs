//! CLI-specific progress handling for progress-dl
//!
//! Provides the progress bar the command-line interface draws notifications on.

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a percentage progress bar for CLI display
pub fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos:>3}% {msg}")
            .expect("Failed to create progress style")
            .progress_chars("#>-"),
    );
    pb
}

/// Progress manager for a single download
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(message: &str) -> Self {
        let pb = create_progress_bar();

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Move the bar to a reported percentage
    ///
    /// Values above 100 only occur when the server sent no usable length;
    /// the bar is pinned at 100 then.
    pub fn update(&self, percent: u64) {
        self.pb.set_position(percent.min(100));
    }

    pub fn finish(&self, message: &str) {
        self.pb.finish_with_message(message.to_string());
    }

    pub fn abandon(&self) {
        self.pb.abandon();
    }
}
